//! per-author key material, change-tracking etags, and organization owner lists
//!
//! keys live at `keys/<author>/<fingerprint>` as raw bytes. an etag at
//! `keys/<author>.etag` is an opaque token owned entirely by the caller (the
//! registry never generates or reads into it). owner lists at
//! `keys/<org>.owners` are newline-delimited author identifiers.

use crate::error::{Error, Result};
use crate::storage::Storage;

const KEYS_ROOT: &str = "keys";

/// key-by-fingerprint storage with revocation and ownership lists
pub struct KeyRegistry<'a, S: Storage> {
    storage: &'a S,
}

impl<'a, S: Storage> KeyRegistry<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// store a key under (author, fingerprint), replacing any prior value
    pub fn put_key(&self, author: &str, fingerprint: &str, key: &[u8]) -> Result<()> {
        self.storage.write(&key_path(author, fingerprint)?, key)
    }

    /// read a key; absent keys are `Ok(None)`
    pub fn read_key(&self, author: &str, fingerprint: &str) -> Result<Option<Vec<u8>>> {
        self.storage.read(&key_path(author, fingerprint)?)
    }

    /// remove a key entirely (no tombstone)
    pub fn revoke_key(&self, author: &str, fingerprint: &str) -> Result<()> {
        let path = key_path(author, fingerprint)?;
        if !self.storage.exists(&path)? {
            return Err(Error::KeyNotFound {
                author: author.to_string(),
                fingerprint: fingerprint.to_string(),
            });
        }
        self.storage.delete(&path)
    }

    /// every fingerprint stored for one author
    pub fn fingerprints(&self, author: &str) -> Result<Vec<String>> {
        validate_segment("author", author)?;
        self.storage.leaves(&format!("{}/{}", KEYS_ROOT, author))
    }

    /// read an author's etag; the registry treats it as opaque bytes
    pub fn etag(&self, author: &str) -> Result<Option<Vec<u8>>> {
        self.storage.read(&etag_path(author)?)
    }

    /// write an author's etag; callers own the token semantics
    /// (e.g. bump on every key mutation)
    pub fn set_etag(&self, author: &str, etag: &[u8]) -> Result<()> {
        self.storage.write(&etag_path(author)?, etag)
    }

    /// authors listed as owners of an organization; an absent list is empty
    pub fn owners(&self, org: &str) -> Result<Vec<String>> {
        let Some(bytes) = self.storage.read(&owners_path(org)?)? else {
            return Ok(vec![]);
        };
        let text = String::from_utf8_lossy(&bytes);
        Ok(text
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// exact-match membership test over the owner list
    pub fn is_owner(&self, org: &str, author: &str) -> Result<bool> {
        Ok(self.owners(org)?.iter().any(|owner| owner == author))
    }

    /// add an author to an organization's owner list (no-op if present)
    ///
    /// the list is rewritten whole (read, append, write); two concurrent
    /// writers to the same list race and the last write wins.
    pub fn add_owner(&self, org: &str, author: &str) -> Result<()> {
        validate_segment("author", author)?;
        let owners = self.owners(org)?;
        if owners.iter().any(|owner| owner == author) {
            return Ok(());
        }

        let mut list = String::new();
        for owner in &owners {
            list.push_str(owner);
            list.push('\n');
        }
        list.push_str(author);
        list.push('\n');
        self.storage.write(&owners_path(org)?, list.as_bytes())
    }

    /// remove an author from an organization's owner list
    ///
    /// rewritten whole like [`add_owner`](Self::add_owner), with the same
    /// last-writer-wins caveat.
    pub fn remove_owner(&self, org: &str, author: &str) -> Result<()> {
        let mut list = String::new();
        for owner in self.owners(org)? {
            if owner != author {
                list.push_str(&owner);
                list.push('\n');
            }
        }
        self.storage.write(&owners_path(org)?, list.as_bytes())
    }
}

fn key_path(author: &str, fingerprint: &str) -> Result<String> {
    validate_segment("author", author)?;
    validate_segment("fingerprint", fingerprint)?;
    Ok(format!("{}/{}/{}", KEYS_ROOT, author, fingerprint))
}

fn etag_path(author: &str) -> Result<String> {
    validate_segment("author", author)?;
    Ok(format!("{}/{}.etag", KEYS_ROOT, author))
}

fn owners_path(org: &str) -> Result<String> {
    validate_segment("org", org)?;
    Ok(format!("{}/{}.owners", KEYS_ROOT, org))
}

fn validate_segment(what: &str, value: &str) -> Result<()> {
    if value.is_empty()
        || value.contains('/')
        || value.contains('\0')
        || value == "."
        || value == ".."
    {
        return Err(Error::InvalidName(format!("{}: {:?}", what, value)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemStore;

    #[test]
    fn test_put_read_key() {
        let storage = MemStore::new();
        let keys = KeyRegistry::new(&storage);

        keys.put_key("alice", "fp1", b"public key bytes").unwrap();
        assert_eq!(
            keys.read_key("alice", "fp1").unwrap(),
            Some(b"public key bytes".to_vec())
        );
        assert_eq!(keys.read_key("alice", "fp2").unwrap(), None);
    }

    #[test]
    fn test_put_key_overwrites() {
        let storage = MemStore::new();
        let keys = KeyRegistry::new(&storage);

        keys.put_key("alice", "fp1", b"old").unwrap();
        keys.put_key("alice", "fp1", b"new").unwrap();
        assert_eq!(keys.read_key("alice", "fp1").unwrap(), Some(b"new".to_vec()));
    }

    #[test]
    fn test_revoke_key() {
        let storage = MemStore::new();
        let keys = KeyRegistry::new(&storage);

        keys.put_key("alice", "fp1", b"bytes").unwrap();
        keys.revoke_key("alice", "fp1").unwrap();
        assert_eq!(keys.read_key("alice", "fp1").unwrap(), None);
    }

    #[test]
    fn test_revoke_missing_key() {
        let storage = MemStore::new();
        let keys = KeyRegistry::new(&storage);

        assert!(matches!(
            keys.revoke_key("alice", "nope"),
            Err(Error::KeyNotFound { .. })
        ));
    }

    #[test]
    fn test_fingerprints() {
        let storage = MemStore::new();
        let keys = KeyRegistry::new(&storage);

        keys.put_key("alice", "fp1", b"a").unwrap();
        keys.put_key("alice", "fp2", b"b").unwrap();
        keys.put_key("bob", "fp3", b"c").unwrap();
        keys.set_etag("alice", b"token").unwrap();

        let fps = keys.fingerprints("alice").unwrap();
        assert_eq!(fps, vec!["fp1", "fp2"]);
        assert!(keys.fingerprints("carol").unwrap().is_empty());
    }

    #[test]
    fn test_etag_roundtrip() {
        let storage = MemStore::new();
        let keys = KeyRegistry::new(&storage);

        assert_eq!(keys.etag("alice").unwrap(), None);
        keys.set_etag("alice", b"\"v1\"").unwrap();
        assert_eq!(keys.etag("alice").unwrap(), Some(b"\"v1\"".to_vec()));
        keys.set_etag("alice", b"\"v2\"").unwrap();
        assert_eq!(keys.etag("alice").unwrap(), Some(b"\"v2\"".to_vec()));
    }

    #[test]
    fn test_etag_does_not_collide_with_keys() {
        let storage = MemStore::new();
        let keys = KeyRegistry::new(&storage);

        keys.put_key("alice", "fp1", b"k").unwrap();
        keys.set_etag("alice", b"tok").unwrap();

        assert_eq!(keys.fingerprints("alice").unwrap(), vec!["fp1"]);
        assert_eq!(keys.read_key("alice", "fp1").unwrap(), Some(b"k".to_vec()));
    }

    #[test]
    fn test_owners_absent_is_empty() {
        let storage = MemStore::new();
        let keys = KeyRegistry::new(&storage);
        assert!(keys.owners("acme").unwrap().is_empty());
        assert!(!keys.is_owner("acme", "bob").unwrap());
    }

    #[test]
    fn test_add_owner_idempotent() {
        let storage = MemStore::new();
        let keys = KeyRegistry::new(&storage);

        keys.add_owner("acme", "bob").unwrap();
        keys.add_owner("acme", "bob").unwrap();

        assert_eq!(keys.owners("acme").unwrap(), vec!["bob"]);
        assert!(keys.is_owner("acme", "bob").unwrap());
    }

    #[test]
    fn test_add_owner_appends() {
        let storage = MemStore::new();
        let keys = KeyRegistry::new(&storage);

        keys.add_owner("acme", "bob").unwrap();
        keys.add_owner("acme", "alice").unwrap();

        assert_eq!(keys.owners("acme").unwrap(), vec!["bob", "alice"]);

        let raw = storage.read("keys/acme.owners").unwrap().unwrap();
        assert_eq!(raw, b"bob\nalice\n".to_vec());
    }

    #[test]
    fn test_remove_owner() {
        let storage = MemStore::new();
        let keys = KeyRegistry::new(&storage);

        keys.add_owner("acme", "bob").unwrap();
        keys.add_owner("acme", "alice").unwrap();
        keys.remove_owner("acme", "bob").unwrap();

        assert_eq!(keys.owners("acme").unwrap(), vec!["alice"]);
        assert!(!keys.is_owner("acme", "bob").unwrap());
    }

    #[test]
    fn test_remove_last_owner() {
        let storage = MemStore::new();
        let keys = KeyRegistry::new(&storage);

        keys.add_owner("acme", "bob").unwrap();
        keys.remove_owner("acme", "bob").unwrap();

        assert!(keys.owners("acme").unwrap().is_empty());
    }

    #[test]
    fn test_remove_owner_from_absent_list() {
        let storage = MemStore::new();
        let keys = KeyRegistry::new(&storage);

        keys.remove_owner("acme", "bob").unwrap();
        assert!(keys.owners("acme").unwrap().is_empty());
    }

    #[test]
    fn test_membership_is_exact_match() {
        let storage = MemStore::new();
        let keys = KeyRegistry::new(&storage);

        keys.add_owner("acme", "bob").unwrap();
        assert!(!keys.is_owner("acme", "bo").unwrap());
        assert!(!keys.is_owner("acme", "bobb").unwrap());
    }

    #[test]
    fn test_invalid_names_rejected() {
        let storage = MemStore::new();
        let keys = KeyRegistry::new(&storage);

        assert!(keys.put_key("", "fp", b"k").is_err());
        assert!(keys.put_key("a/b", "fp", b"k").is_err());
        assert!(keys.put_key("alice", "fp/../x", b"k").is_err());
        assert!(keys.set_etag("..", b"t").is_err());
        assert!(keys.add_owner("org/../x", "bob").is_err());
    }
}

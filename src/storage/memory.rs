use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{Error, Result};
use crate::storage::Storage;

/// in-memory store, for tests and embedding
///
/// entries are held behind an `RwLock` and cloned on read. path hierarchy is
/// derived from the slash-separated keys, so `nodes`/`leaves` behave like the
/// filesystem backend without any directories existing.
#[derive(Default)]
pub struct MemStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemStore {
    /// create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// number of stored entries
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// is the store empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }
}

fn child_prefix(prefix: &str) -> String {
    if prefix.is_empty() {
        String::new()
    } else {
        format!("{}/", prefix)
    }
}

impl Storage for MemStore {
    fn read(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().expect("lock poisoned");
        Ok(entries.get(path).cloned())
    }

    fn write(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let mut entries = self.entries.write().expect("lock poisoned");
        entries.insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<()> {
        let mut entries = self.entries.write().expect("lock poisoned");
        match entries.remove(path) {
            Some(_) => Ok(()),
            None => Err(Error::Io {
                path: PathBuf::from(path),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such entry"),
            }),
        }
    }

    fn nodes(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self.children(prefix, true))
    }

    fn leaves(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self.children(prefix, false))
    }

    fn exists(&self, path: &str) -> Result<bool> {
        let entries = self.entries.read().expect("lock poisoned");
        Ok(entries.contains_key(path))
    }
}

impl MemStore {
    fn children(&self, prefix: &str, dirs: bool) -> Vec<String> {
        let pre = child_prefix(prefix);
        let entries = self.entries.read().expect("lock poisoned");
        let mut names = BTreeSet::new();
        for key in entries.keys() {
            let Some(rest) = key.strip_prefix(&pre) else {
                continue;
            };
            match rest.split_once('/') {
                Some((head, _)) if dirs => {
                    names.insert(head.to_string());
                }
                None if !dirs && !rest.is_empty() => {
                    names.insert(rest.to_string());
                }
                _ => {}
            }
        }
        names.into_iter().collect()
    }
}

impl std::fmt::Debug for MemStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemStore")
            .field("entry_count", &self.len())
            .finish()
    }
}

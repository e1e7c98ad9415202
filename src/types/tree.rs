use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::hash::ObjectId;
use crate::object::ObjectKind;

/// role of a tree entry, with its wire-format octal rendering
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryMode {
    /// subdirectory
    Tree,
    /// regular file
    Regular,
    /// regular file with any execute bit set
    Executable,
    /// symbolic link; the referenced blob holds the link target
    Symlink,
}

impl EntryMode {
    /// octal mode string used in the canonical tree encoding
    pub fn as_octal(&self) -> &'static str {
        match self {
            EntryMode::Tree => "40000",
            EntryMode::Regular => "100644",
            EntryMode::Executable => "100755",
            EntryMode::Symlink => "120000",
        }
    }

    /// parse an octal mode string from the wire
    pub fn from_octal(s: &str) -> Result<Self> {
        match s {
            "40000" => Ok(EntryMode::Tree),
            "100644" => Ok(EntryMode::Regular),
            "100755" => Ok(EntryMode::Executable),
            "120000" => Ok(EntryMode::Symlink),
            other => Err(Error::UnsupportedMode(other.to_string())),
        }
    }

    /// the object kind this mode must reference
    pub fn kind(&self) -> ObjectKind {
        match self {
            EntryMode::Tree => ObjectKind::Tree,
            _ => ObjectKind::Blob,
        }
    }

    /// is this a directory entry
    pub fn is_tree(&self) -> bool {
        matches!(self, EntryMode::Tree)
    }
}

/// a single entry in a tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    pub name: String,
    pub mode: EntryMode,
    pub hash: ObjectId,
}

impl TreeEntry {
    pub fn new(name: impl Into<String>, mode: EntryMode, hash: ObjectId) -> Self {
        Self {
            name: name.into(),
            mode,
            hash,
        }
    }
}

/// an ordered directory listing
///
/// entries are held in the canonical order of the established object format,
/// so encoding a tree always reproduces the same bytes and therefore the
/// same hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// create a new tree, validating names and sorting entries canonically
    pub fn new(mut entries: Vec<TreeEntry>) -> Result<Self> {
        let mut seen = std::collections::BTreeSet::new();
        for entry in &entries {
            validate_entry_name(&entry.name)?;
            if !seen.insert(entry.name.as_str()) {
                return Err(Error::DuplicateEntryName(entry.name.clone()));
            }
        }
        drop(seen);

        entries.sort_by(canonical_cmp);

        Ok(Self { entries })
    }

    /// create an empty tree
    pub fn empty() -> Self {
        Self { entries: vec![] }
    }

    /// get entries slice, in canonical order
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// consume and return entries
    pub fn into_entries(self) -> Vec<TreeEntry> {
        self.entries
    }

    /// look up entry by name
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// is tree empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// canonical entry order: byte-wise name comparison where a directory name
/// compares as if it carried a trailing '/'
fn canonical_cmp(a: &TreeEntry, b: &TreeEntry) -> Ordering {
    let x = a.name.as_bytes();
    let y = b.name.as_bytes();
    let n = x.len().min(y.len());
    match x[..n].cmp(&y[..n]) {
        Ordering::Equal => {
            let xc = x
                .get(n)
                .copied()
                .unwrap_or(if a.mode.is_tree() { b'/' } else { 0 });
            let yc = y
                .get(n)
                .copied()
                .unwrap_or(if b.mode.is_tree() { b'/' } else { 0 });
            xc.cmp(&yc)
        }
        other => other,
    }
}

/// validate an entry name
fn validate_entry_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidEntryName("empty name".to_string()));
    }
    if name.contains('/') {
        return Err(Error::InvalidEntryName(format!(
            "name contains '/': {}",
            name
        )));
    }
    if name.contains('\0') {
        return Err(Error::InvalidEntryName(format!(
            "name contains null byte: {}",
            name
        )));
    }
    if name == "." || name == ".." {
        return Err(Error::InvalidEntryName(format!("reserved name: {}", name)));
    }
    Ok(())
}

//! path-addressed backing store
//!
//! all persistent state lives behind the [`Storage`] trait: a byte-oriented
//! key/value store over hierarchical slash-separated paths. the object store,
//! version registry, and key registry each hold a store handle at
//! construction time, so tests can substitute [`MemStore`] for the on-disk
//! [`FsStore`].

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemStore;

use crate::Result;

/// byte-oriented key/value store over hierarchical paths
pub trait Storage {
    /// read the bytes at a path; absent paths are `Ok(None)`, not an error
    fn read(&self, path: &str) -> Result<Option<Vec<u8>>>;

    /// write bytes at a path, replacing any prior value
    fn write(&self, path: &str, bytes: &[u8]) -> Result<()>;

    /// remove the value at a path; removing an absent path is an error
    fn delete(&self, path: &str) -> Result<()>;

    /// names of the immediate child directories under a prefix;
    /// a missing prefix yields an empty list
    fn nodes(&self, prefix: &str) -> Result<Vec<String>>;

    /// names of the immediate child files under a prefix;
    /// a missing prefix yields an empty list
    fn leaves(&self, prefix: &str) -> Result<Vec<String>>;

    /// whether a path holds a value
    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.read(path)?.is_some())
    }
}

//! hoard - content-addressed object database
//!
//! a git-style object database for a package registry or similar artifact
//! host: typed objects stored by content hash in the loose-object format, a
//! hierarchical semver-aware ref layer on top, and a per-author key registry
//! with organization owner lists. everything persists through one
//! path-addressed backing store.
//!
//! # Core concepts
//!
//! - **Blob**: opaque byte content (file contents, symlink targets)
//! - **Tree**: ordered directory listing pointing at other objects by hash
//! - **Version pointer**: (author, tag, semver version) -> object hash
//! - **Key record**: (author, fingerprint) -> key bytes, with etags and
//!   per-organization owner lists alongside
//!
//! # Hash format
//!
//! object hash = SHA1("<kind> <payload length>\0<payload>")
//!
//! the frame layout and tree encoding follow the established loose-object
//! convention, so hashes interoperate with external tooling reading the same
//! format. stored objects are zlib-compressed frames at
//! `objects/<hex[0:2]>/<hex[2:]>`.
//!
//! # Example usage
//!
//! ```no_run
//! use hoard::{FsStore, ObjectStore, VersionRegistry, ops};
//! use std::path::Path;
//!
//! // initialize a store
//! let store = FsStore::init(Path::new("/path/to/store")).unwrap();
//! let objects = ObjectStore::new(&store);
//!
//! // import a directory tree
//! let (kind, hash) = ops::import(&objects, Path::new("/source")).unwrap();
//!
//! // publish it under a versioned name
//! let refs = VersionRegistry::new(&store);
//! refs.write("alice", "lib", "1.0.0", &hash).unwrap();
//!
//! // resolve and export
//! let (_version, resolved) = refs.resolve("alice", "lib", "^1.0").unwrap().unwrap();
//! ops::export(&objects, &resolved, Path::new("/destination")).unwrap();
//! ```

mod config;
mod error;
mod fs;
mod hash;
mod keys;
mod object;
mod refs;
mod storage;
mod types;

pub mod ops;

pub use config::{Config, FORMAT_VERSION};
pub use error::{Error, Result};
pub use hash::ObjectId;
pub use keys::KeyRegistry;
pub use object::{
    compress, decode_frame, decode_payload, decompress, encode_frame, encode_payload, Object,
    ObjectIds, ObjectKind, ObjectStore,
};
pub use refs::{normalize_version, TagWalk, VersionRegistry};
pub use storage::{FsStore, MemStore, Storage};
pub use types::{EntryMode, Tree, TreeEntry};

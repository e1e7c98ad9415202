use std::path::PathBuf;

use crate::hash::ObjectId;
use crate::object::ObjectKind;

/// error type for hoard operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("store not found at {0}")]
    NoStore(PathBuf),

    #[error("store already exists at {0}")]
    StoreExists(PathBuf),

    #[error("incompatible store format: expected {expected}, found {found}")]
    IncompatibleFormat { expected: u32, found: u32 },

    #[error("invalid object hash: {0}")]
    InvalidHash(String),

    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),

    #[error("object kind mismatch: expected {expected}, found {found}")]
    KindMismatch {
        expected: ObjectKind,
        found: ObjectKind,
    },

    #[error("malformed object: {0}")]
    Format(String),

    #[error("unknown object kind: {0}")]
    UnknownKind(String),

    #[error("unsupported tree entry mode: {0}")]
    UnsupportedMode(String),

    #[error("unsupported file type: {0}")]
    UnsupportedFileType(PathBuf),

    #[error("key not found: {author}/{fingerprint}")]
    KeyNotFound { author: String, fingerprint: String },

    #[error("version {author}/{tag}/{version} vanished between enumeration and read")]
    VersionVanished {
        author: String,
        tag: String,
        version: String,
    },

    #[error("invalid version '{version}': {source}")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("invalid version range '{range}': {source}")]
    InvalidRange {
        range: String,
        #[source]
        source: semver::Error,
    },

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("invalid tree entry name: {0}")]
    InvalidEntryName(String),

    #[error("duplicate tree entry name: {0}")]
    DuplicateEntryName(String),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}

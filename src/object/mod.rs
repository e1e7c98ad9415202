//! typed objects and the content-addressed store
//!
//! an object is an immutable (kind, value) pair addressed by the SHA-1 of its
//! canonical frame `kind || " " || length || NUL || payload`, stored
//! zlib-compressed at `objects/<hex[0:2]>/<hex[2:]>`. the byte layout follows
//! the established loose-object convention, so hashes interoperate with
//! external tooling reading the same format.

mod codec;
mod store;

pub use codec::{compress, decode_frame, decode_payload, decompress, encode_frame, encode_payload};
pub use store::{ObjectIds, ObjectStore};

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::types::Tree;

/// closed set of object kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// opaque byte content
    Blob,
    /// ordered directory listing
    Tree,
}

impl ObjectKind {
    /// kind tag used in the frame header
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
        }
    }
}

impl FromStr for ObjectKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blob" => Ok(ObjectKind::Blob),
            "tree" => Ok(ObjectKind::Tree),
            other => Err(Error::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// a typed object value
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    Blob(Vec<u8>),
    Tree(Tree),
}

impl Object {
    /// the kind tag of this value
    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::Blob(_) => ObjectKind::Blob,
            Object::Tree(_) => ObjectKind::Tree,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!("blob".parse::<ObjectKind>().unwrap(), ObjectKind::Blob);
        assert_eq!("tree".parse::<ObjectKind>().unwrap(), ObjectKind::Tree);
        assert!(matches!(
            "commit".parse::<ObjectKind>(),
            Err(Error::UnknownKind(_))
        ));
    }

    #[test]
    fn test_object_kind() {
        assert_eq!(Object::Blob(vec![]).kind(), ObjectKind::Blob);
        assert_eq!(Object::Tree(Tree::empty()).kind(), ObjectKind::Tree);
    }
}

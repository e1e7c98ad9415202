use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;

use crate::Error;

/// SHA-1 content address, rendered as 40 lowercase hex characters
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 20]);

impl ObjectId {
    /// zero id (useful as sentinel)
    pub const ZERO: ObjectId = ObjectId([0u8; 20]);

    /// create from raw digest bytes
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// parse from hex string; anything but exactly 40 hex characters is rejected
    pub fn from_hex(s: &str) -> crate::Result<Self> {
        if s.len() != 40 {
            return Err(Error::InvalidHash(s.to_string()));
        }
        let bytes = hex::decode(s).map_err(|_| Error::InvalidHash(s.to_string()))?;
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// digest a framed object
    pub fn digest(frame: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(frame);
        Self(hasher.finalize().into())
    }

    /// get raw bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// split into path components for the object store
    /// returns (first 2 hex chars, remaining 38 hex chars)
    pub fn path_components(&self) -> (String, String) {
        let hex = self.to_hex();
        (hex[..2].to_string(), hex[2..].to_string())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", &self.to_hex()[..12])
    }
}

impl Serialize for ObjectId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

//! filesystem helpers for tree export
//!
//! write operations retry exactly once after creating missing parent
//! directories; this is a bounded fallback, not a general retry policy.

use std::ffi::OsStr;
use std::fs;
use std::io::ErrorKind;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::error::{Error, IoResultExt, Result};

/// write a file and set its permission bits, creating missing parents on demand
pub(crate) fn write_file_creating_parents(path: &Path, content: &[u8], mode: u32) -> Result<()> {
    match fs::write(path, content) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).with_path(parent)?;
            }
            fs::write(path, content).with_path(path)?;
        }
        Err(e) => {
            return Err(Error::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    }
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).with_path(path)
}

/// create a symlink to `target`, creating missing parents on demand
pub(crate) fn symlink_creating_parents(target: &[u8], path: &Path) -> Result<()> {
    let target = Path::new(OsStr::from_bytes(target));
    match std::os::unix::fs::symlink(target, path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).with_path(parent)?;
            }
            std::os::unix::fs::symlink(target, path).with_path(path)
        }
        Err(e) => Err(Error::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, IoResultExt, Result};
use crate::hash::ObjectId;
use crate::object::{Object, ObjectKind, ObjectStore};
use crate::storage::Storage;
use crate::types::{EntryMode, Tree, TreeEntry};

/// import a filesystem path into the object graph
///
/// directories become trees, files become blobs (executable when any execute
/// bit is set), symlinks become blobs holding the link target. hidden entries
/// (leading '.') and entries named `modules` are never imported. returns the
/// top-level kind and hash.
pub fn import<S: Storage>(objects: &ObjectStore<'_, S>, source: &Path) -> Result<(ObjectKind, ObjectId)> {
    let meta = fs::symlink_metadata(source).with_path(source)?;
    let file_type = meta.file_type();

    if file_type.is_dir() {
        let hash = import_dir(objects, source)?;
        debug!(path = %source.display(), id = %hash, "tree imported");
        Ok((ObjectKind::Tree, hash))
    } else if file_type.is_file() {
        Ok((ObjectKind::Blob, import_file(objects, source)?))
    } else if file_type.is_symlink() {
        Ok((ObjectKind::Blob, import_symlink(objects, source)?))
    } else {
        Err(Error::UnsupportedFileType(source.to_path_buf()))
    }
}

/// import a directory (recursive helper)
fn import_dir<S: Storage>(objects: &ObjectStore<'_, S>, dir: &Path) -> Result<ObjectId> {
    let mut entries = Vec::new();

    for entry in fs::read_dir(dir).with_path(dir)? {
        let entry = entry.with_path(dir)?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') || name == "modules" {
            continue;
        }

        let path = entry.path();
        let meta = fs::symlink_metadata(&path).with_path(&path)?;
        let file_type = meta.file_type();

        let (mode, hash) = if file_type.is_dir() {
            (EntryMode::Tree, import_dir(objects, &path)?)
        } else if file_type.is_file() {
            let mode = if meta.permissions().mode() & 0o111 != 0 {
                EntryMode::Executable
            } else {
                EntryMode::Regular
            };
            (mode, import_file(objects, &path)?)
        } else if file_type.is_symlink() {
            (EntryMode::Symlink, import_symlink(objects, &path)?)
        } else {
            return Err(Error::UnsupportedFileType(path));
        };

        entries.push(TreeEntry::new(name, mode, hash));
    }

    let tree = Tree::new(entries)?;
    objects.save(&Object::Tree(tree))
}

fn import_file<S: Storage>(objects: &ObjectStore<'_, S>, path: &Path) -> Result<ObjectId> {
    let content = fs::read(path).with_path(path)?;
    objects.save(&Object::Blob(content))
}

/// the link target string is the blob content, not the file it points to
fn import_symlink<S: Storage>(objects: &ObjectStore<'_, S>, path: &Path) -> Result<ObjectId> {
    let target = fs::read_link(path).with_path(path)?;
    objects.save(&Object::Blob(target.as_os_str().as_bytes().to_vec()))
}

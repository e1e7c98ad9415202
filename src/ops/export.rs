use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, IoResultExt, Result};
use crate::hash::ObjectId;
use crate::object::{Object, ObjectKind, ObjectStore};
use crate::storage::Storage;
use crate::types::{EntryMode, Tree};

/// export an object graph to a filesystem path
///
/// trees become directories (parents created as needed), blobs become files
/// or symlinks according to the tree entry mode that references them; a blob
/// at the top level exports as a regular file. every entry's declared mode is
/// checked against the kind actually stored at its hash, so a corrupted graph
/// fails with [`Error::KindMismatch`] instead of writing wrong output.
/// returns the top-level kind.
pub fn export<S: Storage>(
    objects: &ObjectStore<'_, S>,
    id: &ObjectId,
    destination: &Path,
) -> Result<ObjectKind> {
    let object = objects.load(id)?;
    match &object {
        Object::Tree(tree) => {
            fs::create_dir_all(destination).with_path(destination)?;
            export_tree(objects, tree, destination)?;
            debug!(path = %destination.display(), id = %id, "tree exported");
        }
        Object::Blob(content) => {
            crate::fs::write_file_creating_parents(destination, content, 0o644)?;
        }
    }
    Ok(object.kind())
}

/// export a tree's entries into a directory (recursive helper)
fn export_tree<S: Storage>(
    objects: &ObjectStore<'_, S>,
    tree: &Tree,
    destination: &Path,
) -> Result<()> {
    for entry in tree.entries() {
        let path = destination.join(&entry.name);
        let object = objects.load(&entry.hash)?;

        match entry.mode {
            EntryMode::Tree => {
                let subtree = require_kind_tree(object)?;
                fs::create_dir_all(&path).with_path(&path)?;
                export_tree(objects, &subtree, &path)?;
            }
            EntryMode::Symlink => {
                let target = require_kind_blob(object)?;
                crate::fs::symlink_creating_parents(&target, &path)?;
            }
            EntryMode::Regular => {
                let content = require_kind_blob(object)?;
                crate::fs::write_file_creating_parents(&path, &content, 0o644)?;
            }
            EntryMode::Executable => {
                let content = require_kind_blob(object)?;
                crate::fs::write_file_creating_parents(&path, &content, 0o755)?;
            }
        }
    }
    Ok(())
}

fn require_kind_tree(object: Object) -> Result<Tree> {
    match object {
        Object::Tree(tree) => Ok(tree),
        Object::Blob(_) => Err(Error::KindMismatch {
            expected: ObjectKind::Tree,
            found: ObjectKind::Blob,
        }),
    }
}

fn require_kind_blob(object: Object) -> Result<Vec<u8>> {
    match object {
        Object::Blob(content) => Ok(content),
        Object::Tree(_) => Err(Error::KindMismatch {
            expected: ObjectKind::Blob,
            found: ObjectKind::Tree,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::import;
    use crate::storage::FsStore;
    use crate::types::TreeEntry;
    use std::os::unix::fs::{symlink, PermissionsExt};
    use tempfile::tempdir;

    fn test_store(dir: &tempfile::TempDir) -> FsStore {
        FsStore::init(&dir.path().join("store")).unwrap()
    }

    #[test]
    fn test_import_export_roundtrip() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir);
        let objects = ObjectStore::new(&store);

        // a tree with every supported entry flavor, plus excluded names
        let source = dir.path().join("source");
        fs::create_dir_all(source.join("nested")).unwrap();
        fs::write(source.join("plain.txt"), "plain contents").unwrap();
        fs::write(source.join("run.sh"), "#!/bin/sh\necho hi\n").unwrap();
        fs::set_permissions(source.join("run.sh"), fs::Permissions::from_mode(0o755)).unwrap();
        symlink("plain.txt", source.join("link")).unwrap();
        fs::write(source.join("nested/inner.txt"), "inner").unwrap();
        fs::write(source.join(".hidden"), "never imported").unwrap();
        fs::create_dir(source.join("modules")).unwrap();
        fs::write(source.join("modules/skipped"), "never imported").unwrap();

        let (kind, hash) = import(&objects, &source).unwrap();
        assert_eq!(kind, ObjectKind::Tree);

        let out = dir.path().join("out");
        let exported_kind = export(&objects, &hash, &out).unwrap();
        assert_eq!(exported_kind, ObjectKind::Tree);

        // contents round-trip byte-identically
        assert_eq!(fs::read(out.join("plain.txt")).unwrap(), b"plain contents");
        assert_eq!(
            fs::read(out.join("nested/inner.txt")).unwrap(),
            b"inner"
        );

        // executable bit survives
        let mode = fs::metadata(out.join("run.sh")).unwrap().permissions().mode();
        assert_ne!(mode & 0o111, 0);
        let mode = fs::metadata(out.join("plain.txt")).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0);

        // symlink target survives as a link, not a copy
        let meta = fs::symlink_metadata(out.join("link")).unwrap();
        assert!(meta.file_type().is_symlink());
        assert_eq!(
            fs::read_link(out.join("link")).unwrap(),
            Path::new("plain.txt")
        );

        // excluded names were never imported, so they are absent on export
        assert!(!out.join(".hidden").exists());
        assert!(!out.join("modules").exists());
    }

    #[test]
    fn test_export_blob_as_file() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir);
        let objects = ObjectStore::new(&store);

        let hash = objects.save(&Object::Blob(b"loose bytes".to_vec())).unwrap();
        let out = dir.path().join("deep/parents/file.bin");

        let kind = export(&objects, &hash, &out).unwrap();
        assert_eq!(kind, ObjectKind::Blob);
        assert_eq!(fs::read(&out).unwrap(), b"loose bytes");
    }

    #[test]
    fn test_export_missing_object() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir);
        let objects = ObjectStore::new(&store);

        let missing = ObjectId::from_hex("0000000000000000000000000000000000000000").unwrap();
        let result = export(&objects, &missing, &dir.path().join("out"));
        assert!(matches!(result, Err(Error::ObjectNotFound(_))));
    }

    #[test]
    fn test_export_detects_kind_mismatch() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir);
        let objects = ObjectStore::new(&store);

        // tree entry whose mode claims tree but whose hash stores a blob
        let blob = objects.save(&Object::Blob(b"not a tree".to_vec())).unwrap();
        let tree = Tree::new(vec![TreeEntry::new("dir", EntryMode::Tree, blob)]).unwrap();
        let hash = objects.save(&Object::Tree(tree)).unwrap();

        let result = export(&objects, &hash, &dir.path().join("out"));
        assert!(matches!(
            result,
            Err(Error::KindMismatch {
                expected: ObjectKind::Tree,
                found: ObjectKind::Blob,
            })
        ));
    }

    #[test]
    fn test_export_detects_blob_mode_on_tree() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir);
        let objects = ObjectStore::new(&store);

        let subtree = objects.save(&Object::Tree(Tree::empty())).unwrap();
        let tree = Tree::new(vec![TreeEntry::new("file", EntryMode::Regular, subtree)]).unwrap();
        let hash = objects.save(&Object::Tree(tree)).unwrap();

        let result = export(&objects, &hash, &dir.path().join("out"));
        assert!(matches!(
            result,
            Err(Error::KindMismatch {
                expected: ObjectKind::Blob,
                found: ObjectKind::Tree,
            })
        ));
    }

    #[test]
    fn test_export_empty_tree() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir);
        let objects = ObjectStore::new(&store);

        let hash = objects.save(&Object::Tree(Tree::empty())).unwrap();
        let out = dir.path().join("empty");

        export(&objects, &hash, &out).unwrap();
        assert!(out.is_dir());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn test_reimport_of_export_is_identical() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir);
        let objects = ObjectStore::new(&store);

        let source = dir.path().join("source");
        fs::create_dir_all(source.join("a/b")).unwrap();
        fs::write(source.join("a/b/c.txt"), "payload").unwrap();
        symlink("b/c.txt", source.join("a/link")).unwrap();

        let (_, h1) = import(&objects, &source).unwrap();
        let out = dir.path().join("out");
        export(&objects, &h1, &out).unwrap();
        let (_, h2) = import(&objects, &out).unwrap();

        assert_eq!(h1, h2);
    }
}

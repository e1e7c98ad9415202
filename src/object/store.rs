use tracing::debug;

use crate::error::{Error, Result};
use crate::hash::ObjectId;
use crate::object::{codec, Object, ObjectKind};
use crate::storage::Storage;
use crate::types::Tree;

const OBJECTS_ROOT: &str = "objects";

/// content-addressed get/put over a backing store
pub struct ObjectStore<'a, S: Storage> {
    storage: &'a S,
}

impl<'a, S: Storage> ObjectStore<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// save an object, returning its content address
    ///
    /// identical values always land at the same path with identical bytes, so
    /// saving is idempotent; an already-present path is skipped without
    /// re-verification.
    pub fn save(&self, object: &Object) -> Result<ObjectId> {
        let payload = codec::encode_payload(object);
        let frame = codec::encode_frame(object.kind(), &payload);
        let id = ObjectId::digest(&frame);

        let path = object_path(&id);
        if self.storage.exists(&path)? {
            debug!(id = %id, kind = %object.kind(), "object already present");
            return Ok(id);
        }

        let compressed = codec::compress(&frame)?;
        self.storage.write(&path, &compressed)?;
        debug!(id = %id, kind = %object.kind(), "object stored");

        Ok(id)
    }

    /// load an object by content address
    pub fn load(&self, id: &ObjectId) -> Result<Object> {
        let compressed = self
            .storage
            .read(&object_path(id))?
            .ok_or(Error::ObjectNotFound(*id))?;
        let frame = codec::decompress(&compressed)?;
        let (kind, payload) = codec::decode_frame(&frame)?;
        codec::decode_payload(kind, payload)
    }

    /// load an object, requiring it to be a blob
    pub fn load_blob(&self, id: &ObjectId) -> Result<Vec<u8>> {
        match self.load(id)? {
            Object::Blob(content) => Ok(content),
            other => Err(Error::KindMismatch {
                expected: ObjectKind::Blob,
                found: other.kind(),
            }),
        }
    }

    /// load an object, requiring it to be a tree
    pub fn load_tree(&self, id: &ObjectId) -> Result<Tree> {
        match self.load(id)? {
            Object::Tree(tree) => Ok(tree),
            other => Err(Error::KindMismatch {
                expected: ObjectKind::Tree,
                found: other.kind(),
            }),
        }
    }

    /// check if an object exists
    pub fn contains(&self, id: &ObjectId) -> Result<bool> {
        self.storage.exists(&object_path(id))
    }

    /// lazily enumerate every stored object id
    ///
    /// walks the two-level fan-out (prefix directories, then leaves within
    /// each). order is backend-dependent; no ordering is guaranteed.
    pub fn ids(&self) -> Result<ObjectIds<'a, S>> {
        let mut prefixes = self.storage.nodes(OBJECTS_ROOT)?;
        prefixes.reverse();
        Ok(ObjectIds {
            storage: self.storage,
            prefixes,
            prefix: String::new(),
            leaves: Vec::new(),
        })
    }
}

fn object_path(id: &ObjectId) -> String {
    let (dir, file) = id.path_components();
    format!("{}/{}/{}", OBJECTS_ROOT, dir, file)
}

/// iterator over stored object ids
///
/// traversal state is an explicit pair of stacks (pending prefix directories,
/// leaves of the current prefix) rather than recursion, so the walk is
/// restartable from any point and cheap to suspend.
pub struct ObjectIds<'a, S: Storage> {
    storage: &'a S,
    prefixes: Vec<String>,
    prefix: String,
    leaves: Vec<String>,
}

impl<S: Storage> Iterator for ObjectIds<'_, S> {
    type Item = Result<ObjectId>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(leaf) = self.leaves.pop() {
                return Some(ObjectId::from_hex(&format!("{}{}", self.prefix, leaf)));
            }

            let prefix = self.prefixes.pop()?;
            match self
                .storage
                .leaves(&format!("{}/{}", OBJECTS_ROOT, prefix))
            {
                Ok(mut leaves) => {
                    leaves.reverse();
                    self.leaves = leaves;
                    self.prefix = prefix;
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

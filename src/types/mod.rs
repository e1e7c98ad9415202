//! value types shared across the object layer

mod tree;

pub use tree::{EntryMode, Tree, TreeEntry};

//! whole-tree operations over the object store

mod export;
mod import;

pub use export::export;
pub use import::import;

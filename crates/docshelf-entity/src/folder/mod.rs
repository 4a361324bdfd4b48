//! Folder domain entities.

pub mod model;
pub mod tree;

pub use model::{ChildRef, Folder};
pub use tree::{FolderNode, FolderTree};

//! # docshelf-entity
//!
//! Domain entity models for DocShelf. Every struct in this crate is a plain
//! value object owned by the tree store; callers only ever see clones.
//! All entities derive `Debug`, `Clone`, `Serialize`, and `Deserialize`.

pub mod encoding;
pub mod file;
pub mod folder;
pub mod view;

pub use file::{File, UploadCandidate};
pub use folder::{ChildRef, Folder, FolderNode, FolderTree};
pub use view::ViewMode;

//! Folder/file tree store and the queries over it.

pub mod invariants;
pub mod query;
pub mod store;

pub use query::LibraryStats;
pub use store::{DeleteOptions, DeletedCounts, Library};

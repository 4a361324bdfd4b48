//! # docshelf-storage
//!
//! Durable storage for DocShelf. Provides a filesystem-backed
//! [`KeyValueStore`](docshelf_core::traits::KeyValueStore), a selector that
//! opens the backend named in configuration, and first-page thumbnail
//! generation on top of a [`PdfRenderer`](docshelf_core::traits::PdfRenderer).

pub mod manager;
pub mod providers;
pub mod thumbnail;

pub use manager::open_store;
pub use providers::FileKvStore;
pub use thumbnail::ThumbnailGenerator;

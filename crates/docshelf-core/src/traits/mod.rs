//! Core traits defined in `docshelf-core` and implemented by other crates.

pub mod kv;
pub mod renderer;

pub use kv::{KeyValueStore, StoreUsage};
pub use renderer::{DocumentHandle, PageRaster, PdfRenderer};

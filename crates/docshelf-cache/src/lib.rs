//! # docshelf-cache
//!
//! In-process storage for DocShelf:
//!
//! - **memory**: a quota-enforcing [`KeyValueStore`](docshelf_core::traits::KeyValueStore)
//!   backed by [dashmap](https://crates.io/crates/dashmap), used for tests
//!   and ephemeral sessions
//! - **page**: a bounded cache of rendered page rasters using
//!   [moka](https://crates.io/crates/moka)

pub mod memory;
pub mod page;

pub use memory::MemoryKvStore;
pub use page::{PageCache, PageKey};

//! Key-value backend implementations.

pub mod local;

pub use local::FileKvStore;

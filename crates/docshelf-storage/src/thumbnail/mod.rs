//! Thumbnail generation.

pub mod generator;

pub use generator::ThumbnailGenerator;

//! # docshelf-service
//!
//! Library logic for DocShelf. The [`Library`] tree store owns every folder
//! and file; [`LibraryService`] applies mutations to it and persists them
//! through the [`PersistenceGateway`]. Uploads and the document viewer sit
//! on top.
//!
//! Services follow constructor injection: collaborators are passed in at
//! construction time.

pub mod codec;
pub mod file;
pub mod library;
pub mod notice;
pub mod persistence;
pub mod tree;

pub use file::{BatchReport, UploadService, ViewerSession};
pub use library::{Download, ImportMode, ImportSummary, LibraryService};
pub use notice::{Notice, Severity};
pub use persistence::PersistenceGateway;
pub use tree::{DeleteOptions, DeletedCounts, Library, LibraryStats};

//! File upload and viewing.

pub mod preview;
pub mod upload;

pub use preview::ViewerSession;
pub use upload::{BatchReport, UploadOutcome, UploadService};

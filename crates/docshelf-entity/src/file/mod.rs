//! File domain entities.

pub mod model;
pub mod upload;

pub use model::{File, PDF_EXTENSION, normalize_pdf_name};
pub use upload::{OCTET_STREAM_MIME_TYPE, PDF_MIME_TYPE, UploadCandidate, sniff_mime_type};

//! Upload candidates handed over by the upload collaborator.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// MIME type every admitted upload must carry.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// MIME type used when nothing better is known.
pub const OCTET_STREAM_MIME_TYPE: &str = "application/octet-stream";

/// Leading bytes of every PDF document.
const PDF_MAGIC: &[u8] = b"%PDF-";

/// A file offered for upload, before admission checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadCandidate {
    /// Original file name.
    pub name: String,
    /// Declared size in bytes.
    pub size: u64,
    /// Declared MIME type.
    pub mime_type: String,
    /// File content.
    #[serde(skip)]
    pub data: Bytes,
}

impl UploadCandidate {
    /// Build a candidate whose size is taken from `data`.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            size: data.len() as u64,
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Returns `true` if the declared MIME type is PDF.
    pub fn is_pdf(&self) -> bool {
        self.mime_type.eq_ignore_ascii_case(PDF_MIME_TYPE)
    }
}

/// Guess a MIME type from the file name and leading content bytes.
pub fn sniff_mime_type(name: &str, data: &[u8]) -> &'static str {
    if data.starts_with(PDF_MAGIC) || name.to_lowercase().ends_with(".pdf") {
        PDF_MIME_TYPE
    } else {
        OCTET_STREAM_MIME_TYPE
    }
}

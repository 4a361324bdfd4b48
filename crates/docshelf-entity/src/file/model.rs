//! File entity model.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docshelf_core::types::{FileId, FolderId};

use crate::encoding;

/// Extension every stored document name carries.
pub const PDF_EXTENSION: &str = ".pdf";

/// A PDF document stored in the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    /// Unique file identifier.
    pub id: FileId,
    /// The file name, always ending in `.pdf`.
    pub name: String,
    /// The folder containing this file.
    pub folder_id: FolderId,
    /// Size of the original payload in bytes.
    pub size: u64,
    /// When the file was added to the library.
    pub upload_date: DateTime<Utc>,
    /// Raw PDF bytes.
    #[serde(with = "encoding::radix64")]
    pub payload: Bytes,
    /// PNG preview of the first page, if one could be generated.
    #[serde(
        default,
        with = "encoding::radix64_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub thumbnail: Option<Bytes>,
}

/// Trim `name` and make sure it ends with `.pdf` (case-insensitive).
///
/// Returns `None` when nothing but whitespace is left.
pub fn normalize_pdf_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.to_lowercase().ends_with(PDF_EXTENSION) {
        Some(trimmed.to_string())
    } else {
        Some(format!("{trimmed}{PDF_EXTENSION}"))
    }
}

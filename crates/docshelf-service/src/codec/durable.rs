//! The durable document written to the key-value store.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use docshelf_core::error::{AppError, ErrorKind};
use docshelf_core::result::AppResult;
use docshelf_core::types::{FileId, FolderId};
use docshelf_entity::{File, Folder, ViewMode};

use super::{assemble, collect_entries};
use crate::tree::Library;

/// Version written into every durable document.
pub const DURABLE_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DurableDocumentRef<'a> {
    format_version: u32,
    folders: Vec<(&'a FolderId, &'a Folder)>,
    files: Vec<(&'a FileId, &'a File)>,
    current_folder_id: FolderId,
    view_mode: ViewMode,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DurableDocument {
    format_version: u32,
    folders: Vec<(FolderId, Folder)>,
    files: Vec<(FileId, File)>,
    #[serde(default)]
    current_folder_id: Option<FolderId>,
    #[serde(default)]
    view_mode: ViewMode,
}

/// Serialize `library` to compact JSON, entities ordered by id.
pub fn to_durable(library: &Library) -> AppResult<Bytes> {
    let doc = DurableDocumentRef {
        format_version: DURABLE_FORMAT_VERSION,
        folders: library.folders().iter().collect(),
        files: library.files().iter().collect(),
        current_folder_id: library.current_folder_id(),
        view_mode: library.view_mode(),
    };
    Ok(Bytes::from(serde_json::to_vec(&doc)?))
}

/// Rebuild a library from a durable document.
///
/// Dangling child references are dropped with a warning. Anything else that
/// is malformed or inconsistent fails with `Corrupt`.
pub fn from_durable(data: &[u8]) -> AppResult<Library> {
    let doc: DurableDocument = serde_json::from_slice(data).map_err(|e| {
        AppError::with_source(ErrorKind::Corrupt, "Durable document is malformed", e)
    })?;

    if doc.format_version != DURABLE_FORMAT_VERSION {
        return Err(AppError::corrupt(format!(
            "Unsupported durable format version {}",
            doc.format_version
        )));
    }

    let folders = collect_entries(doc.folders, |f: &Folder| f.id, "Folder")?;
    let files = collect_entries(doc.files, |f: &File| f.id, "File")?;
    assemble(folders, files, doc.current_folder_id, doc.view_mode)
}

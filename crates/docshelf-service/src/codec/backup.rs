//! The portable backup document used for export and import.

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docshelf_core::error::{AppError, ErrorKind};
use docshelf_core::result::AppResult;
use docshelf_core::types::{FileId, FolderId};
use docshelf_entity::{File, Folder};

use super::collect_entries;
use crate::tree::Library;
use crate::tree::invariants::check_records;

/// Version tag written into, and accepted from, backup documents.
pub const BACKUP_VERSION: &str = "1.0";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BackupDocumentRef<'a> {
    version: &'static str,
    export_date: DateTime<Utc>,
    folders: Vec<(&'a FolderId, &'a Folder)>,
    files: Vec<(&'a FileId, &'a File)>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackupDocument {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    export_date: Option<DateTime<Utc>>,
    folders: Vec<(FolderId, Folder)>,
    files: Vec<(FileId, File)>,
}

/// Entity collections read from a backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupContents {
    /// When the backup was taken, if recorded.
    pub export_date: Option<DateTime<Utc>>,
    /// Every folder in the backup.
    pub folders: BTreeMap<FolderId, Folder>,
    /// Every file in the backup.
    pub files: BTreeMap<FileId, File>,
}

/// Serialize `library` as a pretty-printed, versioned backup document.
pub fn to_backup(library: &Library) -> AppResult<Bytes> {
    let doc = BackupDocumentRef {
        version: BACKUP_VERSION,
        export_date: Utc::now(),
        folders: library.folders().iter().collect(),
        files: library.files().iter().collect(),
    };
    Ok(Bytes::from(serde_json::to_vec_pretty(&doc)?))
}

/// Parse a backup document.
///
/// Fails with `InvalidFormat` unless both entity collections are present and
/// well formed, when a version tag other than `"1.0"` is present, or when a
/// record breaks the naming or size rules enforced on every write.
pub fn from_backup(data: &[u8]) -> AppResult<BackupContents> {
    let doc: BackupDocument = serde_json::from_slice(data).map_err(|e| {
        AppError::with_source(ErrorKind::InvalidFormat, "Backup document is malformed", e)
    })?;

    if let Some(version) = doc.version.as_deref() {
        if version != BACKUP_VERSION {
            return Err(AppError::invalid_format(format!(
                "Unsupported backup version '{version}'"
            )));
        }
    }

    let folders = collect_entries(doc.folders, |f: &Folder| f.id, "Folder")
        .map_err(|e| AppError::invalid_format(e.message))?;
    let files = collect_entries(doc.files, |f: &File| f.id, "File")
        .map_err(|e| AppError::invalid_format(e.message))?;
    check_records(&folders, &files).map_err(|e| AppError::invalid_format(e.message))?;

    Ok(BackupContents {
        export_date: doc.export_date,
        folders,
        files,
    })
}

#[cfg(test)]
mod tests {
    use docshelf_core::types::SequentialIdGenerator;

    use super::*;

    fn sample() -> Library {
        let ids = SequentialIdGenerator::new();
        let mut lib = Library::new("My Documents");
        let a = lib.create_folder(&ids, FolderId::ROOT, "Taxes").unwrap();
        lib.add_file(&ids, a, "2024.pdf", Bytes::from_static(b"%PDF-2024"), None)
            .unwrap();
        lib
    }

    #[test]
    fn test_backup_is_pretty_and_versioned() {
        let bytes = to_backup(&sample()).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.contains('\n'));

        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["version"], "1.0");
        assert!(json["exportDate"].is_string());
        assert_eq!(json["files"][0][1]["payload"], "JVBERi0yMDI0");
    }

    #[test]
    fn test_roundtrip_returns_collections() {
        let lib = sample();
        let contents = from_backup(&to_backup(&lib).unwrap()).unwrap();
        assert_eq!(&contents.folders, lib.folders());
        assert_eq!(&contents.files, lib.files());
        assert!(contents.export_date.is_some());
    }

    #[test]
    fn test_missing_files_collection_is_invalid() {
        let err = from_backup(br#"{"version":"1.0","folders":[]}"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_wrong_version_is_invalid() {
        let err = from_backup(br#"{"version":"2.0","folders":[],"files":[]}"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidFormat);
    }

    fn tampered(edit: impl FnOnce(&mut serde_json::Value)) -> Vec<u8> {
        let mut json: serde_json::Value =
            serde_json::from_slice(&to_backup(&sample()).unwrap()).unwrap();
        edit(&mut json);
        serde_json::to_vec(&json).unwrap()
    }

    #[test]
    fn test_blank_folder_name_is_invalid() {
        // Entry 0 is the root (nil id), entry 1 is "Taxes".
        let data = tampered(|json| json["folders"][1][1]["name"] = "   ".into());
        let err = from_backup(&data).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_file_name_outside_pdf_form_is_invalid() {
        let data = tampered(|json| json["files"][0][1]["name"] = "../../.bashrc".into());
        let err = from_backup(&data).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_size_not_matching_payload_is_invalid() {
        let data = tampered(|json| json["files"][0][1]["size"] = 999_999.into());
        let err = from_backup(&data).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_untagged_backup_is_accepted() {
        let contents = from_backup(br#"{"folders":[],"files":[]}"#).unwrap();
        assert!(contents.folders.is_empty());
        assert!(contents.export_date.is_none());
    }
}

//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docshelf_core::types::{FileId, FolderId};

/// A reference to one entry in a folder's ordered child list.
///
/// Folders and files share the list, so each entry carries its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ChildRef {
    /// A sub-folder.
    Folder(FolderId),
    /// A file.
    File(FileId),
}

impl ChildRef {
    /// The folder id, if this entry is a folder.
    pub fn as_folder(&self) -> Option<FolderId> {
        match self {
            Self::Folder(id) => Some(*id),
            Self::File(_) => None,
        }
    }

    /// The file id, if this entry is a file.
    pub fn as_file(&self) -> Option<FileId> {
        match self {
            Self::File(id) => Some(*id),
            Self::Folder(_) => None,
        }
    }
}

/// A folder in the document hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// Display name, unique case-insensitively among sibling folders.
    pub name: String,
    /// Parent folder ID (null for the root folder).
    #[serde(default)]
    pub parent_id: Option<FolderId>,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// Child folders and files in display order.
    #[serde(default)]
    pub children: Vec<ChildRef>,
}

impl Folder {
    /// Create an empty folder under `parent_id`.
    pub fn new(id: FolderId, name: impl Into<String>, parent_id: FolderId) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id: Some(parent_id),
            created_at: Utc::now(),
            children: Vec::new(),
        }
    }

    /// Create the root folder.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            id: FolderId::ROOT,
            name: name.into(),
            parent_id: None,
            created_at: Utc::now(),
            children: Vec::new(),
        }
    }

    /// Check if this is the root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Check whether `child` is listed in this folder.
    pub fn contains(&self, child: &ChildRef) -> bool {
        self.children.contains(child)
    }

    /// Remove `child` from the child list. Returns `true` if it was present.
    pub fn detach(&mut self, child: &ChildRef) -> bool {
        let before = self.children.len();
        self.children.retain(|c| c != child);
        self.children.len() != before
    }

    /// Ids of the direct sub-folders, in display order.
    pub fn folder_ids(&self) -> impl Iterator<Item = FolderId> + '_ {
        self.children.iter().filter_map(ChildRef::as_folder)
    }

    /// Ids of the direct files, in display order.
    pub fn file_ids(&self) -> impl Iterator<Item = FileId> + '_ {
        self.children.iter().filter_map(ChildRef::as_file)
    }

    /// Case-insensitive name comparison used for sibling uniqueness.
    pub fn name_matches(&self, other: &str) -> bool {
        self.name.to_lowercase() == other.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_child_ref_serializes_tagged() {
        let id = FileId::from_uuid(Uuid::from_u128(3));
        let json = serde_json::to_value(ChildRef::File(id)).unwrap();
        assert_eq!(json["kind"], "file");
        assert_eq!(json["id"], id.to_string());
    }

    #[test]
    fn test_detach_reports_presence() {
        let mut root = Folder::root("My Documents");
        let child = ChildRef::Folder(FolderId::from_uuid(Uuid::from_u128(9)));
        root.children.push(child);
        assert!(root.detach(&child));
        assert!(!root.detach(&child));
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_name_matches_ignores_case() {
        let folder = Folder::new(
            FolderId::from_uuid(Uuid::from_u128(2)),
            "Reports",
            FolderId::ROOT,
        );
        assert!(folder.name_matches("reports"));
        assert!(!folder.name_matches("report"));
    }
}

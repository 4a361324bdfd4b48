//! Read-only views over a [`Library`]: breadcrumbs, listings, counts and
//! the sidebar tree.

use serde::{Deserialize, Serialize};

use docshelf_core::types::FolderId;
use docshelf_entity::{File, Folder, FolderNode, FolderTree};

use super::store::Library;

/// Library-wide totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryStats {
    /// Number of folders, root included.
    pub folder_count: usize,
    /// Number of files.
    pub file_count: usize,
    /// Sum of all payload sizes in bytes.
    pub total_bytes: u64,
    /// Number of files carrying a thumbnail.
    pub thumbnail_count: usize,
}

impl Library {
    /// Folders from the root down to `folder_id`, both inclusive.
    ///
    /// An unknown `folder_id` yields an empty path. If an ancestor cannot be
    /// resolved the path starts at the last resolvable one.
    pub fn folder_path(&self, folder_id: FolderId) -> Vec<&Folder> {
        let mut path = Vec::new();
        let mut cursor = self.folders.get(&folder_id);
        while let Some(folder) = cursor {
            path.push(folder);
            if path.len() > self.folders.len() {
                break;
            }
            cursor = folder.parent_id.and_then(|id| self.folders.get(&id));
        }
        path.reverse();
        path
    }

    /// Files directly inside `folder_id`, in display order.
    ///
    /// A non-blank `filter` keeps only names containing it, ignoring case.
    pub fn list_files(&self, folder_id: FolderId, filter: Option<&str>) -> Vec<&File> {
        let needle = filter
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_lowercase);

        let Some(folder) = self.folders.get(&folder_id) else {
            return Vec::new();
        };
        folder
            .file_ids()
            .filter_map(|id| self.files.get(&id))
            .filter(|file| match &needle {
                Some(needle) => file.name.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .collect()
    }

    /// Sub-folders directly inside `folder_id`, in display order.
    pub fn list_folders(&self, folder_id: FolderId) -> Vec<&Folder> {
        self.folders
            .get(&folder_id)
            .map(|folder| {
                folder
                    .folder_ids()
                    .filter_map(|id| self.folders.get(&id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of files directly inside `folder_id`.
    pub fn file_count(&self, folder_id: FolderId) -> usize {
        self.folders
            .get(&folder_id)
            .map(|folder| {
                folder
                    .file_ids()
                    .filter(|id| self.files.contains_key(id))
                    .count()
            })
            .unwrap_or(0)
    }

    /// Number of files inside `folder_id` and all of its sub-folders.
    pub fn total_file_count(&self, folder_id: FolderId) -> usize {
        let mut total = 0;
        let mut stack = vec![folder_id];
        let mut visited = 0;
        while let Some(id) = stack.pop() {
            visited += 1;
            if visited > self.folders.len() {
                break;
            }
            if let Some(folder) = self.folders.get(&id) {
                total += self.file_count(id);
                stack.extend(folder.folder_ids());
            }
        }
        total
    }

    /// The whole folder hierarchy with per-folder file counts.
    pub fn folder_tree(&self) -> FolderTree {
        let root = self.build_node(self.root(), 0);
        let total_folders = root.walk().len();
        FolderTree {
            root,
            total_folders,
        }
    }

    fn build_node(&self, folder: &Folder, depth: u32) -> FolderNode {
        let children = folder
            .folder_ids()
            .filter_map(|id| self.folders.get(&id))
            .map(|child| self.build_node(child, depth + 1))
            .collect();

        FolderNode {
            id: folder.id,
            name: folder.name.clone(),
            depth,
            file_count: self.file_count(folder.id),
            children,
        }
    }

    /// Library-wide totals.
    pub fn stats(&self) -> LibraryStats {
        LibraryStats {
            folder_count: self.folders.len(),
            file_count: self.files.len(),
            total_bytes: self.files.values().map(|f| f.size).sum(),
            thumbnail_count: self.files.values().filter(|f| f.thumbnail.is_some()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use docshelf_core::types::SequentialIdGenerator;

    use super::*;

    fn pdf(len: usize) -> Bytes {
        Bytes::from(vec![b'%'; len])
    }

    #[test]
    fn test_list_files_filters_case_insensitively_in_order() {
        let ids = SequentialIdGenerator::new();
        let mut lib = Library::new("My Documents");
        for name in ["Invoice.pdf", "report.pdf", "INVENTORY.pdf"] {
            lib.add_file(&ids, FolderId::ROOT, name, pdf(1), None)
                .unwrap();
        }

        let names: Vec<&str> = lib
            .list_files(FolderId::ROOT, Some("inv"))
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, ["Invoice.pdf", "INVENTORY.pdf"]);

        assert_eq!(lib.list_files(FolderId::ROOT, Some("  ")).len(), 3);
        assert_eq!(lib.list_files(FolderId::ROOT, None).len(), 3);
    }

    #[test]
    fn test_folder_path_runs_root_to_target() {
        let ids = SequentialIdGenerator::new();
        let mut lib = Library::new("My Documents");
        let a = lib.create_folder(&ids, FolderId::ROOT, "A").unwrap();
        let b = lib.create_folder(&ids, a, "B").unwrap();

        let names: Vec<&str> = lib.folder_path(b).iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["My Documents", "A", "B"]);

        let unknown = FolderId::from_uuid(uuid::Uuid::from_u128(77));
        assert!(lib.folder_path(unknown).is_empty());
    }

    #[test]
    fn test_counts_and_tree() {
        let ids = SequentialIdGenerator::new();
        let mut lib = Library::new("My Documents");
        let a = lib.create_folder(&ids, FolderId::ROOT, "A").unwrap();
        let b = lib.create_folder(&ids, a, "B").unwrap();
        lib.add_file(&ids, FolderId::ROOT, "r.pdf", pdf(10), None)
            .unwrap();
        lib.add_file(&ids, a, "a.pdf", pdf(20), None).unwrap();
        lib.add_file(&ids, b, "b.pdf", pdf(30), Some(pdf(1)))
            .unwrap();

        assert_eq!(lib.file_count(FolderId::ROOT), 1);
        assert_eq!(lib.total_file_count(FolderId::ROOT), 3);
        assert_eq!(lib.total_file_count(a), 2);
        assert_eq!(lib.list_folders(FolderId::ROOT).len(), 1);

        let tree = lib.folder_tree();
        assert_eq!(tree.total_folders, 3);
        assert_eq!(tree.root.child_count(), 1);
        assert_eq!(tree.root.children[0].children[0].depth, 2);
        assert_eq!(tree.root.children[0].children[0].file_count, 1);

        let stats = lib.stats();
        assert_eq!(stats.folder_count, 3);
        assert_eq!(stats.file_count, 3);
        assert_eq!(stats.total_bytes, 60);
        assert_eq!(stats.thumbnail_count, 1);
    }
}

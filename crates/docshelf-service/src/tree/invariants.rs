//! Structural consistency checks over a [`Library`].

use std::collections::{BTreeMap, HashMap, HashSet};

use docshelf_core::error::AppError;
use docshelf_core::result::AppResult;
use docshelf_core::types::{FileId, FolderId};
use docshelf_entity::file::normalize_pdf_name;
use docshelf_entity::{ChildRef, File, Folder};

use super::store::Library;

/// Check every record on its own, independent of the tree shape.
///
/// Fails with `Corrupt` for a blank folder name, a file name that is not
/// already in its normalized `.pdf` form, or a file whose recorded size
/// differs from its payload length.
pub(crate) fn check_records(
    folders: &BTreeMap<FolderId, Folder>,
    files: &BTreeMap<FileId, File>,
) -> AppResult<()> {
    for folder in folders.values() {
        if folder.name.trim().is_empty() {
            return Err(AppError::corrupt(format!(
                "Folder {} has a blank name",
                folder.id
            )));
        }
    }

    for file in files.values() {
        if normalize_pdf_name(&file.name).as_deref() != Some(file.name.as_str()) {
            return Err(AppError::corrupt(format!(
                "File {} has an invalid name '{}'",
                file.id, file.name
            )));
        }
        if file.size != file.payload.len() as u64 {
            return Err(AppError::corrupt(format!(
                "File {} records {} bytes but holds {}",
                file.id,
                file.size,
                file.payload.len()
            )));
        }
    }

    Ok(())
}

impl Library {
    /// Verify every structural invariant of the tree.
    ///
    /// Fails with `Corrupt` naming the first violation found:
    /// - exactly one parentless folder, the root
    /// - every non-root folder and every file is referenced by exactly one
    ///   folder, and that folder is its recorded parent
    /// - every parent chain reaches the root
    /// - sub-folder names are unique per parent, ignoring case
    /// - no child reference dangles
    /// - every record passes the per-record checks: folder names are not
    ///   blank, file names end in `.pdf` with no surrounding whitespace,
    ///   and file sizes match their payloads
    pub fn check_invariants(&self) -> AppResult<()> {
        check_records(&self.folders, &self.files)?;

        let roots: Vec<FolderId> = self
            .folders
            .values()
            .filter(|f| f.parent_id.is_none())
            .map(|f| f.id)
            .collect();
        if roots != [FolderId::ROOT] {
            return Err(AppError::corrupt(format!(
                "Expected exactly the root folder to have no parent, found {roots:?}"
            )));
        }

        for (key, folder) in &self.folders {
            if *key != folder.id {
                return Err(AppError::corrupt(format!(
                    "Folder stored under {key} carries id {}",
                    folder.id
                )));
            }
        }
        for (key, file) in &self.files {
            if *key != file.id {
                return Err(AppError::corrupt(format!(
                    "File stored under {key} carries id {}",
                    file.id
                )));
            }
        }

        let mut holders: HashMap<ChildRef, Vec<FolderId>> = HashMap::new();
        for folder in self.folders.values() {
            for child in &folder.children {
                let resolves = match child {
                    ChildRef::Folder(id) => self.folders.contains_key(id),
                    ChildRef::File(id) => self.files.contains_key(id),
                };
                if !resolves {
                    return Err(AppError::corrupt(format!(
                        "Folder {} references missing {child:?}",
                        folder.id
                    )));
                }
                holders.entry(*child).or_default().push(folder.id);
            }
        }

        for folder in self.folders.values() {
            let listed = holders.get(&ChildRef::Folder(folder.id));
            match (folder.parent_id, listed.map(Vec::as_slice)) {
                (None, None) => {}
                (None, Some(_)) => {
                    return Err(AppError::corrupt("The root folder is listed as a child"));
                }
                (Some(parent), Some([holder])) if *holder == parent => {}
                (Some(parent), other) => {
                    return Err(AppError::corrupt(format!(
                        "Folder {} has parent {parent} but is listed by {:?}",
                        folder.id,
                        other.unwrap_or_default()
                    )));
                }
            }
        }

        for file in self.files.values() {
            match holders.get(&ChildRef::File(file.id)).map(Vec::as_slice) {
                Some([holder]) if *holder == file.folder_id => {}
                other => {
                    return Err(AppError::corrupt(format!(
                        "File {} belongs to {} but is listed by {:?}",
                        file.id,
                        file.folder_id,
                        other.unwrap_or_default()
                    )));
                }
            }
        }

        for folder in self.folders.values() {
            if !self.is_within(folder.id, FolderId::ROOT) {
                return Err(AppError::corrupt(format!(
                    "Folder {} is not reachable from the root",
                    folder.id
                )));
            }
        }

        for folder in self.folders.values() {
            let mut seen = HashSet::new();
            for sibling in folder.folder_ids().filter_map(|id| self.folders.get(&id)) {
                if !seen.insert(sibling.name.to_lowercase()) {
                    return Err(AppError::corrupt(format!(
                        "Folder {} holds more than one sub-folder named '{}'",
                        folder.id, sibling.name
                    )));
                }
            }
        }

        if !self.folders.contains_key(&self.current_folder_id) {
            return Err(AppError::corrupt(format!(
                "Current folder {} does not exist",
                self.current_folder_id
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use docshelf_core::error::ErrorKind;
    use docshelf_core::types::{FileId, SequentialIdGenerator};

    use super::*;

    fn sample() -> (Library, SequentialIdGenerator, FolderId, FileId) {
        let ids = SequentialIdGenerator::new();
        let mut lib = Library::new("My Documents");
        let a = lib.create_folder(&ids, FolderId::ROOT, "A").unwrap();
        let f = lib
            .add_file(&ids, a, "doc.pdf", Bytes::from_static(b"%PDF"), None)
            .unwrap();
        (lib, ids, a, f)
    }

    #[test]
    fn test_valid_tree_passes() {
        let (lib, _, _, _) = sample();
        lib.check_invariants().unwrap();
    }

    #[test]
    fn test_dangling_reference_is_corrupt() {
        let (mut lib, _, a, f) = sample();
        lib.files.remove(&f);
        let err = lib.check_invariants().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Corrupt);
        assert!(lib.folders[&a].contains(&ChildRef::File(f)));
    }

    #[test]
    fn test_double_listing_is_corrupt() {
        let (mut lib, _, _, f) = sample();
        lib.folders
            .get_mut(&FolderId::ROOT)
            .unwrap()
            .children
            .push(ChildRef::File(f));
        assert_eq!(lib.check_invariants().unwrap_err().kind, ErrorKind::Corrupt);
    }

    #[test]
    fn test_cycle_is_corrupt() {
        let (mut lib, ids, a, _) = sample();
        let b = lib.create_folder(&ids, a, "B").unwrap();
        lib.folders.get_mut(&a).unwrap().parent_id = Some(b);
        assert_eq!(lib.check_invariants().unwrap_err().kind, ErrorKind::Corrupt);
    }

    #[test]
    fn test_blank_folder_name_is_corrupt() {
        let (mut lib, _, a, _) = sample();
        lib.folders.get_mut(&a).unwrap().name = "   ".into();
        assert_eq!(lib.check_invariants().unwrap_err().kind, ErrorKind::Corrupt);
    }

    #[test]
    fn test_file_name_without_extension_is_corrupt() {
        let (mut lib, _, _, f) = sample();
        lib.files.get_mut(&f).unwrap().name = "../../.bashrc".into();
        assert_eq!(lib.check_invariants().unwrap_err().kind, ErrorKind::Corrupt);

        lib.files.get_mut(&f).unwrap().name = " doc.pdf".into();
        assert_eq!(lib.check_invariants().unwrap_err().kind, ErrorKind::Corrupt);
    }

    #[test]
    fn test_size_mismatch_is_corrupt() {
        let (mut lib, _, _, f) = sample();
        lib.files.get_mut(&f).unwrap().size = 999_999;
        assert_eq!(lib.check_invariants().unwrap_err().kind, ErrorKind::Corrupt);
    }

    #[test]
    fn test_duplicate_sibling_names_are_corrupt() {
        let (mut lib, ids, _, _) = sample();
        let b = lib.create_folder(&ids, FolderId::ROOT, "B").unwrap();
        lib.folders.get_mut(&b).unwrap().name = "a".into();
        assert_eq!(lib.check_invariants().unwrap_err().kind, ErrorKind::Corrupt);
    }
}

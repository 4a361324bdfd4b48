//! The in-memory folder/file tree and its structural mutations.

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use docshelf_core::error::AppError;
use docshelf_core::result::AppResult;
use docshelf_core::types::{FileId, FolderId, IdGenerator};
use docshelf_entity::file::normalize_pdf_name;
use docshelf_entity::{ChildRef, File, Folder, ViewMode};

/// Options for [`Library::delete_folder`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    /// Remove every descendant folder and file instead of rejecting a
    /// non-empty folder.
    pub cascade: bool,
}

impl DeleteOptions {
    /// Options with cascading enabled.
    pub fn cascade() -> Self {
        Self { cascade: true }
    }
}

/// Number of records removed by a folder deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedCounts {
    /// Folders removed, the target included.
    pub folders: usize,
    /// Files removed.
    pub files: usize,
}

/// The complete document library: every folder, every file and the view
/// state that goes with them.
///
/// All mutations either succeed and leave the tree consistent, or fail and
/// leave it untouched. Entity maps are ordered by id so serialized output
/// is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    pub(crate) folders: BTreeMap<FolderId, Folder>,
    pub(crate) files: BTreeMap<FileId, File>,
    pub(crate) current_folder_id: FolderId,
    pub(crate) view_mode: ViewMode,
}

impl Library {
    /// Create a library holding only the root folder.
    pub fn new(root_name: &str) -> Self {
        let root = Folder::root(root_name);
        let mut folders = BTreeMap::new();
        folders.insert(root.id, root);
        Self {
            folders,
            files: BTreeMap::new(),
            current_folder_id: FolderId::ROOT,
            view_mode: ViewMode::default(),
        }
    }

    /// The root folder.
    pub fn root(&self) -> &Folder {
        // The root is inserted at construction and can never be deleted.
        &self.folders[&FolderId::ROOT]
    }

    /// All folders, ordered by id.
    pub fn folders(&self) -> &BTreeMap<FolderId, Folder> {
        &self.folders
    }

    /// All files, ordered by id.
    pub fn files(&self) -> &BTreeMap<FileId, File> {
        &self.files
    }

    /// The folder the user is looking at.
    pub fn current_folder_id(&self) -> FolderId {
        self.current_folder_id
    }

    /// Grid or list presentation.
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Look up a folder.
    pub fn resolve_folder(&self, id: FolderId) -> Option<&Folder> {
        self.folders.get(&id)
    }

    /// Look up a file.
    pub fn resolve_file(&self, id: FileId) -> Option<&File> {
        self.files.get(&id)
    }

    fn folder_or_not_found(&self, id: FolderId) -> AppResult<&Folder> {
        self.folders
            .get(&id)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    fn folder_or_parent_not_found(&self, id: FolderId) -> AppResult<&Folder> {
        self.folders
            .get(&id)
            .ok_or_else(|| AppError::parent_not_found(format!("Target folder {id} not found")))
    }

    fn file_or_not_found(&self, id: FileId) -> AppResult<&File> {
        self.files
            .get(&id)
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }

    /// Fail with `DuplicateName` if `parent` already holds a sub-folder
    /// named `name` (case-insensitive), ignoring `except`.
    fn ensure_unique_name(
        &self,
        parent: &Folder,
        name: &str,
        except: Option<FolderId>,
    ) -> AppResult<()> {
        let clash = parent
            .folder_ids()
            .filter(|id| Some(*id) != except)
            .filter_map(|id| self.folders.get(&id))
            .any(|sibling| sibling.name_matches(name));
        if clash {
            return Err(AppError::duplicate_name(format!(
                "A folder named '{name}' already exists in '{}'",
                parent.name
            )));
        }
        Ok(())
    }

    /// Mutable access to a folder that is known to exist.
    fn folder_mut(&mut self, id: FolderId) -> AppResult<&mut Folder> {
        self.folders
            .get_mut(&id)
            .ok_or_else(|| AppError::internal(format!("Folder {id} vanished during mutation")))
    }

    /// Returns `true` if `candidate` is `ancestor` or lies below it.
    pub fn is_within(&self, candidate: FolderId, ancestor: FolderId) -> bool {
        let mut cursor = Some(candidate);
        let mut steps = 0;
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.folders.len() {
                return false;
            }
            cursor = self.folders.get(&id).and_then(|f| f.parent_id);
        }
        false
    }

    // ── Folders ──────────────────────────────────────────────────────

    /// Create a sub-folder of `parent_id` and append it to the parent's
    /// children.
    pub fn create_folder(
        &mut self,
        ids: &dyn IdGenerator,
        parent_id: FolderId,
        name: &str,
    ) -> AppResult<FolderId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Folder name cannot be empty"));
        }
        let parent = self.folder_or_parent_not_found(parent_id)?;
        self.ensure_unique_name(parent, name, None)?;

        let id = ids.folder_id();
        if self.folders.contains_key(&id) {
            return Err(AppError::internal(format!("Generated folder id {id} is already in use")));
        }
        self.folder_mut(parent_id)?.children.push(ChildRef::Folder(id));
        self.folders.insert(id, Folder::new(id, name, parent_id));
        Ok(id)
    }

    /// Rename a folder. The root cannot be renamed.
    pub fn rename_folder(&mut self, id: FolderId, new_name: &str) -> AppResult<()> {
        let folder = self.folder_or_not_found(id)?;
        let Some(parent_id) = folder.parent_id else {
            return Err(AppError::not_allowed("The root folder cannot be renamed"));
        };
        let name = new_name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Folder name cannot be empty"));
        }
        let parent = self.folder_or_not_found(parent_id)?;
        self.ensure_unique_name(parent, name, Some(id))?;

        self.folder_mut(id)?.name = name.to_string();
        Ok(())
    }

    /// Move a folder, with everything below it, under `target_id`.
    pub fn move_folder(&mut self, id: FolderId, target_id: FolderId) -> AppResult<()> {
        let folder = self.folder_or_not_found(id)?;
        let Some(old_parent_id) = folder.parent_id else {
            return Err(AppError::not_allowed("The root folder cannot be moved"));
        };
        let name = folder.name.clone();
        let target = self.folder_or_parent_not_found(target_id)?;
        if self.is_within(target_id, id) {
            return Err(AppError::not_allowed(format!(
                "Cannot move '{name}' into itself or one of its sub-folders"
            )));
        }
        if old_parent_id == target_id {
            return Ok(());
        }
        self.ensure_unique_name(target, &name, Some(id))?;

        let child = ChildRef::Folder(id);
        self.folder_mut(old_parent_id)?.detach(&child);
        self.folder_mut(target_id)?.children.push(child);
        self.folder_mut(id)?.parent_id = Some(target_id);
        Ok(())
    }

    /// Delete a folder.
    ///
    /// Without [`DeleteOptions::cascade`] a folder that still has children is
    /// rejected with `NotEmpty`. If the current folder disappears, the view
    /// falls back to the deleted folder's parent.
    pub fn delete_folder(&mut self, id: FolderId, options: DeleteOptions) -> AppResult<DeletedCounts> {
        let folder = self.folder_or_not_found(id)?;
        let Some(parent_id) = folder.parent_id else {
            return Err(AppError::not_allowed("The root folder cannot be deleted"));
        };
        if !folder.children.is_empty() && !options.cascade {
            return Err(AppError::not_empty(format!(
                "Folder '{}' contains {} item(s)",
                folder.name,
                folder.children.len()
            )));
        }

        let mut doomed_folders = Vec::new();
        let mut doomed_files = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            doomed_folders.push(next);
            if let Some(f) = self.folders.get(&next) {
                stack.extend(f.folder_ids());
                doomed_files.extend(f.file_ids());
            }
        }

        self.folder_mut(parent_id)?.detach(&ChildRef::Folder(id));
        for file_id in &doomed_files {
            self.files.remove(file_id);
        }
        for folder_id in &doomed_folders {
            self.folders.remove(folder_id);
        }
        if !self.folders.contains_key(&self.current_folder_id) {
            self.current_folder_id = parent_id;
        }

        Ok(DeletedCounts {
            folders: doomed_folders.len(),
            files: doomed_files.len(),
        })
    }

    // ── Files ────────────────────────────────────────────────────────

    /// Add a file to `folder_id`. The name gets a `.pdf` extension if it
    /// lacks one, and the size is taken from the payload.
    pub fn add_file(
        &mut self,
        ids: &dyn IdGenerator,
        folder_id: FolderId,
        name: &str,
        payload: Bytes,
        thumbnail: Option<Bytes>,
    ) -> AppResult<FileId> {
        self.folder_or_parent_not_found(folder_id)?;
        let name = normalize_pdf_name(name)
            .ok_or_else(|| AppError::validation("File name cannot be empty"))?;

        let id = ids.file_id();
        if self.files.contains_key(&id) {
            return Err(AppError::internal(format!("Generated file id {id} is already in use")));
        }
        self.folder_mut(folder_id)?.children.push(ChildRef::File(id));
        self.files.insert(
            id,
            File {
                id,
                name,
                folder_id,
                size: payload.len() as u64,
                upload_date: Utc::now(),
                payload,
                thumbnail,
            },
        );
        Ok(id)
    }

    /// Rename a file, normalizing the extension.
    pub fn rename_file(&mut self, id: FileId, new_name: &str) -> AppResult<()> {
        self.file_or_not_found(id)?;
        let name = normalize_pdf_name(new_name)
            .ok_or_else(|| AppError::validation("File name cannot be empty"))?;
        if let Some(file) = self.files.get_mut(&id) {
            file.name = name;
        }
        Ok(())
    }

    /// Move a file into `target_id`. Moving into its current folder is a
    /// successful no-op.
    pub fn move_file(&mut self, id: FileId, target_id: FolderId) -> AppResult<()> {
        let old_folder_id = self.file_or_not_found(id)?.folder_id;
        self.folder_or_parent_not_found(target_id)?;
        if old_folder_id == target_id {
            return Ok(());
        }

        let child = ChildRef::File(id);
        self.folder_mut(old_folder_id)?.detach(&child);
        self.folder_mut(target_id)?.children.push(child);
        if let Some(file) = self.files.get_mut(&id) {
            file.folder_id = target_id;
        }
        Ok(())
    }

    /// Replace the thumbnail of a file.
    pub fn set_thumbnail(&mut self, id: FileId, thumbnail: Option<Bytes>) -> AppResult<()> {
        self.file_or_not_found(id)?;
        if let Some(file) = self.files.get_mut(&id) {
            file.thumbnail = thumbnail;
        }
        Ok(())
    }

    /// Remove a file and its child reference.
    pub fn delete_file(&mut self, id: FileId) -> AppResult<File> {
        let folder_id = self.file_or_not_found(id)?.folder_id;
        if let Some(folder) = self.folders.get_mut(&folder_id) {
            folder.detach(&ChildRef::File(id));
        }
        self.files
            .remove(&id)
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }

    // ── View state ───────────────────────────────────────────────────

    /// Change the folder the user is looking at.
    pub fn set_current_folder(&mut self, id: FolderId) -> AppResult<()> {
        self.folder_or_not_found(id)?;
        self.current_folder_id = id;
        Ok(())
    }

    /// Change the presentation mode.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docshelf_core::error::ErrorKind;
    use docshelf_core::types::SequentialIdGenerator;

    fn pdf() -> Bytes {
        Bytes::from_static(b"%PDF-1.4 test")
    }

    #[test]
    fn test_new_library_has_only_root() {
        let lib = Library::new("My Documents");
        assert_eq!(lib.folders().len(), 1);
        assert_eq!(lib.root().name, "My Documents");
        assert!(lib.root().is_root());
        assert_eq!(lib.current_folder_id(), FolderId::ROOT);
        lib.check_invariants().unwrap();
    }

    #[test]
    fn test_create_folder_rejects_case_insensitive_duplicate() {
        let ids = SequentialIdGenerator::new();
        let mut lib = Library::new("My Documents");
        lib.create_folder(&ids, FolderId::ROOT, "Reports").unwrap();
        let before = lib.clone();

        let err = lib
            .create_folder(&ids, FolderId::ROOT, "reports")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateName);
        assert_eq!(lib, before);
    }

    #[test]
    fn test_create_folder_validation() {
        let ids = SequentialIdGenerator::new();
        let mut lib = Library::new("My Documents");
        let err = lib.create_folder(&ids, FolderId::ROOT, "   ").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let missing = FolderId::from_uuid(uuid::Uuid::from_u128(999));
        let err = lib.create_folder(&ids, missing, "X").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParentNotFound);
    }

    #[test]
    fn test_same_name_allowed_under_different_parents() {
        let ids = SequentialIdGenerator::new();
        let mut lib = Library::new("My Documents");
        let a = lib.create_folder(&ids, FolderId::ROOT, "A").unwrap();
        lib.create_folder(&ids, a, "Reports").unwrap();
        lib.create_folder(&ids, FolderId::ROOT, "Reports").unwrap();
        lib.check_invariants().unwrap();
    }

    #[test]
    fn test_add_file_normalizes_name_and_size() {
        let ids = SequentialIdGenerator::new();
        let mut lib = Library::new("My Documents");
        let id = lib
            .add_file(&ids, FolderId::ROOT, "scan", pdf(), None)
            .unwrap();
        let file = lib.resolve_file(id).unwrap();
        assert_eq!(file.name, "scan.pdf");
        assert_eq!(file.size, pdf().len() as u64);
        assert_eq!(lib.root().children, vec![ChildRef::File(id)]);
    }

    #[test]
    fn test_move_file_reparents_atomically() {
        let ids = SequentialIdGenerator::new();
        let mut lib = Library::new("My Documents");
        let x = lib.create_folder(&ids, FolderId::ROOT, "X").unwrap();
        let file = lib
            .add_file(&ids, FolderId::ROOT, "a.pdf", pdf(), None)
            .unwrap();

        lib.move_file(file, x).unwrap();
        assert!(!lib.root().contains(&ChildRef::File(file)));
        assert!(lib.resolve_folder(x).unwrap().contains(&ChildRef::File(file)));
        assert_eq!(lib.resolve_file(file).unwrap().folder_id, x);

        let before = lib.clone();
        lib.move_file(file, x).unwrap();
        assert_eq!(lib, before);
        lib.check_invariants().unwrap();
    }

    #[test]
    fn test_rename_file_rejects_blank() {
        let ids = SequentialIdGenerator::new();
        let mut lib = Library::new("My Documents");
        let file = lib
            .add_file(&ids, FolderId::ROOT, "a.pdf", pdf(), None)
            .unwrap();
        assert_eq!(
            lib.rename_file(file, " ").unwrap_err().kind,
            ErrorKind::Validation
        );
        lib.rename_file(file, "Invoice").unwrap();
        assert_eq!(lib.resolve_file(file).unwrap().name, "Invoice.pdf");
    }

    #[test]
    fn test_delete_unknown_file_is_noop() {
        let mut lib = Library::new("My Documents");
        let before = lib.clone();
        let err = lib
            .delete_file(FileId::from_uuid(uuid::Uuid::from_u128(42)))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(lib, before);
    }

    #[test]
    fn test_move_folder_rejects_cycles() {
        let ids = SequentialIdGenerator::new();
        let mut lib = Library::new("My Documents");
        let a = lib.create_folder(&ids, FolderId::ROOT, "A").unwrap();
        let b = lib.create_folder(&ids, a, "B").unwrap();

        assert_eq!(lib.move_folder(a, b).unwrap_err().kind, ErrorKind::NotAllowed);
        assert_eq!(lib.move_folder(a, a).unwrap_err().kind, ErrorKind::NotAllowed);
        assert_eq!(
            lib.move_folder(FolderId::ROOT, a).unwrap_err().kind,
            ErrorKind::NotAllowed
        );

        lib.move_folder(b, FolderId::ROOT).unwrap();
        assert_eq!(lib.resolve_folder(b).unwrap().parent_id, Some(FolderId::ROOT));
        lib.check_invariants().unwrap();
    }

    #[test]
    fn test_move_folder_rejects_name_clash_at_target() {
        let ids = SequentialIdGenerator::new();
        let mut lib = Library::new("My Documents");
        let a = lib.create_folder(&ids, FolderId::ROOT, "A").unwrap();
        let nested = lib.create_folder(&ids, a, "Reports").unwrap();
        lib.create_folder(&ids, FolderId::ROOT, "REPORTS").unwrap();

        let err = lib.move_folder(nested, FolderId::ROOT).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateName);
    }

    #[test]
    fn test_rename_folder_allows_case_change_of_itself() {
        let ids = SequentialIdGenerator::new();
        let mut lib = Library::new("My Documents");
        let a = lib.create_folder(&ids, FolderId::ROOT, "Reports").unwrap();
        lib.create_folder(&ids, FolderId::ROOT, "Taxes").unwrap();

        lib.rename_folder(a, "REPORTS").unwrap();
        assert_eq!(
            lib.rename_folder(a, "taxes").unwrap_err().kind,
            ErrorKind::DuplicateName
        );
        assert_eq!(
            lib.rename_folder(FolderId::ROOT, "Home").unwrap_err().kind,
            ErrorKind::NotAllowed
        );
    }

    #[test]
    fn test_delete_folder_non_cascading_rejects_non_empty() {
        let ids = SequentialIdGenerator::new();
        let mut lib = Library::new("My Documents");
        let a = lib.create_folder(&ids, FolderId::ROOT, "A").unwrap();
        lib.add_file(&ids, a, "x.pdf", pdf(), None).unwrap();

        let err = lib.delete_folder(a, DeleteOptions::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotEmpty);
        assert!(lib.resolve_folder(a).is_some());
    }

    #[test]
    fn test_delete_folder_cascades_and_moves_view_up() {
        let ids = SequentialIdGenerator::new();
        let mut lib = Library::new("My Documents");
        let a = lib.create_folder(&ids, FolderId::ROOT, "A").unwrap();
        let b = lib.create_folder(&ids, a, "B").unwrap();
        lib.add_file(&ids, a, "x.pdf", pdf(), None).unwrap();
        lib.add_file(&ids, b, "y.pdf", pdf(), None).unwrap();
        let kept = lib
            .add_file(&ids, FolderId::ROOT, "z.pdf", pdf(), None)
            .unwrap();
        lib.set_current_folder(b).unwrap();

        let counts = lib.delete_folder(a, DeleteOptions::cascade()).unwrap();
        assert_eq!(counts, DeletedCounts { folders: 2, files: 2 });
        assert_eq!(lib.folders().len(), 1);
        assert_eq!(lib.files().len(), 1);
        assert!(lib.resolve_file(kept).is_some());
        assert_eq!(lib.current_folder_id(), FolderId::ROOT);
        lib.check_invariants().unwrap();
    }

    #[test]
    fn test_root_cannot_be_deleted() {
        let mut lib = Library::new("My Documents");
        let err = lib
            .delete_folder(FolderId::ROOT, DeleteOptions::cascade())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotAllowed);
    }

    #[test]
    fn test_set_current_folder_requires_existing_folder() {
        let mut lib = Library::new("My Documents");
        let err = lib
            .set_current_folder(FolderId::from_uuid(uuid::Uuid::from_u128(5)))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        lib.set_view_mode(ViewMode::List);
        assert_eq!(lib.view_mode(), ViewMode::List);
    }
}

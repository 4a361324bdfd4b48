//! The library service: one tree store, its persistence, and the
//! operations the user performs on them.

use std::str::FromStr;
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use docshelf_core::config::library::LibraryConfig;
use docshelf_core::error::AppError;
use docshelf_core::result::AppResult;
use docshelf_core::traits::kv::StoreUsage;
use docshelf_core::types::{FileId, FolderId, IdGenerator};
use docshelf_entity::{ChildRef, ViewMode};

use crate::codec::{self, BackupContents};
use crate::persistence::PersistenceGateway;
use crate::tree::{DeleteOptions, DeletedCounts, Library};

/// How an imported backup is combined with the current library.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Discard the current library and use the backup's tree.
    #[default]
    Replace,
    /// Add the backup's unknown entities to the current library.
    Merge,
}

impl FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "merge" => Ok(Self::Merge),
            other => Err(format!("Unknown import mode: '{other}'")),
        }
    }
}

/// Outcome of a successful import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Folders now present that came from the backup, root excluded.
    pub folders: usize,
    /// Files now present that came from the backup.
    pub files: usize,
}

/// A file's name and original bytes, ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// File name, ending in `.pdf`.
    pub name: String,
    /// Original PDF bytes.
    pub data: Bytes,
}

/// Owns the library and keeps it in step with the durable store.
///
/// Every mutation runs on a copy of the library, the copy is saved, and it
/// replaces the live library only once the save succeeded. A failed save
/// therefore leaves both the in-memory and the stored state as they were.
#[derive(Debug)]
pub struct LibraryService {
    /// The live library.
    library: Library,
    /// Durable storage.
    gateway: PersistenceGateway,
    /// Source of new entity ids.
    ids: Arc<dyn IdGenerator>,
    /// Library settings.
    config: LibraryConfig,
}

impl LibraryService {
    /// Load the stored library. Never fails; see [`PersistenceGateway::load`].
    pub async fn open(
        gateway: PersistenceGateway,
        ids: Arc<dyn IdGenerator>,
        config: LibraryConfig,
    ) -> Self {
        let library = gateway.load().await;
        Self {
            library,
            gateway,
            ids,
            config,
        }
    }

    /// Read access to the live library and its queries.
    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Library settings.
    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    /// Byte usage of the durable store.
    pub async fn usage(&self) -> AppResult<StoreUsage> {
        self.gateway.usage().await
    }

    /// Apply `op` to a copy, persist the copy, then commit it.
    async fn apply<T>(
        &mut self,
        op: impl FnOnce(&mut Library, &dyn IdGenerator) -> AppResult<T>,
    ) -> AppResult<T> {
        let mut draft = self.library.clone();
        let out = op(&mut draft, self.ids.as_ref())?;
        self.gateway.save(&draft).await?;
        self.library = draft;
        Ok(out)
    }

    // ── Folders ──────────────────────────────────────────────────────

    /// Create a sub-folder.
    pub async fn create_folder(&mut self, parent_id: FolderId, name: &str) -> AppResult<FolderId> {
        let id = self
            .apply(|lib, ids| lib.create_folder(ids, parent_id, name))
            .await?;
        info!(folder_id = %id, parent_id = %parent_id, name = name.trim(), "Folder created");
        Ok(id)
    }

    /// Rename a folder.
    pub async fn rename_folder(&mut self, id: FolderId, new_name: &str) -> AppResult<()> {
        self.apply(|lib, _| lib.rename_folder(id, new_name)).await?;
        info!(folder_id = %id, name = new_name.trim(), "Folder renamed");
        Ok(())
    }

    /// Move a folder under another one.
    pub async fn move_folder(&mut self, id: FolderId, target_id: FolderId) -> AppResult<()> {
        self.apply(|lib, _| lib.move_folder(id, target_id)).await?;
        info!(folder_id = %id, target_id = %target_id, "Folder moved");
        Ok(())
    }

    /// Delete a folder.
    pub async fn delete_folder(
        &mut self,
        id: FolderId,
        options: DeleteOptions,
    ) -> AppResult<DeletedCounts> {
        let counts = self.apply(|lib, _| lib.delete_folder(id, options)).await?;
        info!(
            folder_id = %id,
            folders = counts.folders,
            files = counts.files,
            "Folder deleted"
        );
        Ok(counts)
    }

    // ── Files ────────────────────────────────────────────────────────

    /// Add a file.
    pub async fn add_file(
        &mut self,
        folder_id: FolderId,
        name: &str,
        payload: Bytes,
        thumbnail: Option<Bytes>,
    ) -> AppResult<FileId> {
        let size = payload.len();
        let id = self
            .apply(|lib, ids| lib.add_file(ids, folder_id, name, payload, thumbnail))
            .await?;
        info!(file_id = %id, folder_id = %folder_id, size, "File added");
        Ok(id)
    }

    /// Rename a file.
    pub async fn rename_file(&mut self, id: FileId, new_name: &str) -> AppResult<()> {
        self.apply(|lib, _| lib.rename_file(id, new_name)).await?;
        info!(file_id = %id, "File renamed");
        Ok(())
    }

    /// Move a file into another folder.
    pub async fn move_file(&mut self, id: FileId, target_id: FolderId) -> AppResult<()> {
        self.apply(|lib, _| lib.move_file(id, target_id)).await?;
        info!(file_id = %id, target_id = %target_id, "File moved");
        Ok(())
    }

    /// Delete a file.
    pub async fn delete_file(&mut self, id: FileId) -> AppResult<()> {
        let removed = self.apply(|lib, _| lib.delete_file(id)).await?;
        info!(file_id = %id, name = %removed.name, "File deleted");
        Ok(())
    }

    /// The name and bytes of a stored file.
    pub fn download_file(&self, id: FileId) -> AppResult<Download> {
        let file = self
            .library
            .resolve_file(id)
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))?;
        Ok(Download {
            name: file.name.clone(),
            data: file.payload.clone(),
        })
    }

    // ── View state ───────────────────────────────────────────────────

    /// Change the current folder.
    pub async fn set_current_folder(&mut self, id: FolderId) -> AppResult<()> {
        self.apply(|lib, _| lib.set_current_folder(id)).await
    }

    /// Change the view mode.
    pub async fn set_view_mode(&mut self, mode: ViewMode) -> AppResult<()> {
        self.apply(|lib, _| {
            lib.set_view_mode(mode);
            Ok(())
        })
        .await
    }

    // ── Backup ───────────────────────────────────────────────────────

    /// Serialize the whole library as a backup document.
    pub fn export_backup(&self) -> AppResult<Bytes> {
        let bytes = codec::to_backup(&self.library)?;
        info!(
            folders = self.library.folders().len(),
            files = self.library.files().len(),
            bytes = bytes.len(),
            "Library exported"
        );
        Ok(bytes)
    }

    /// Import a backup document. A failed import leaves the library as it
    /// was.
    pub async fn import_backup(&mut self, data: &[u8], mode: ImportMode) -> AppResult<ImportSummary> {
        let contents = codec::from_backup(data)?;
        let root_name = self.config.root_name.clone();

        let summary = self
            .apply(|lib, _| match mode {
                ImportMode::Replace => replace_with(lib, contents, &root_name),
                ImportMode::Merge => merge_into(lib, contents),
            })
            .await?;
        info!(
            mode = ?mode,
            folders = summary.folders,
            files = summary.files,
            "Backup imported"
        );
        Ok(summary)
    }

    /// Wipe the stored library and start again with only the root folder.
    pub async fn clear(&mut self) -> AppResult<()> {
        self.library = self.gateway.clear().await?;
        Ok(())
    }
}

fn invalid_import(e: AppError) -> AppError {
    AppError::invalid_format(format!("Backup is not a consistent library: {}", e.message))
}

/// Replace `lib` with the backup's tree, keeping the view mode.
fn replace_with(lib: &mut Library, contents: BackupContents, root_name: &str) -> AppResult<ImportSummary> {
    let BackupContents { mut folders, files, .. } = contents;
    if folders.is_empty() {
        let root = Library::new(root_name).root().clone();
        folders.insert(root.id, root);
    }
    let summary = ImportSummary {
        folders: folders.len().saturating_sub(1),
        files: files.len(),
    };
    *lib = codec::assemble(folders, files, None, lib.view_mode()).map_err(invalid_import)?;
    Ok(summary)
}

/// Add every backup entity whose id is unknown to `lib`.
///
/// Imported entities keep their place in the imported tree. When their
/// imported parent already exists locally (the root always does) they are
/// appended to the local folder's children.
fn merge_into(lib: &mut Library, contents: BackupContents) -> AppResult<ImportSummary> {
    let BackupContents { folders, files, .. } = contents;

    let new_folders: Vec<FolderId> = folders
        .keys()
        .filter(|id| !lib.folders.contains_key(id))
        .copied()
        .collect();
    let new_files: Vec<FileId> = files
        .keys()
        .filter(|id| !lib.files.contains_key(id))
        .copied()
        .collect();
    let is_new = |child: &ChildRef| match child {
        ChildRef::Folder(id) => new_folders.binary_search(id).is_ok(),
        ChildRef::File(id) => new_files.binary_search(id).is_ok(),
    };

    let mut merged_folders = lib.folders.clone();
    let mut merged_files = lib.files.clone();

    for (id, mut folder) in folders {
        folder.children.retain(|child| is_new(child));
        match merged_folders.get_mut(&id) {
            Some(local) => local.children.extend(folder.children),
            None => {
                merged_folders.insert(id, folder);
            }
        }
    }
    for (id, file) in files {
        if new_files.binary_search(&id).is_ok() {
            merged_files.insert(id, file);
        }
    }

    let merged = codec::assemble(
        merged_folders,
        merged_files,
        Some(lib.current_folder_id()),
        lib.view_mode(),
    )
    .map_err(invalid_import)?;

    if merged.folders().len() == lib.folders().len() && merged.files().len() == lib.files().len() {
        warn!("Backup contained nothing new to merge");
    }
    *lib = merged;
    Ok(ImportSummary {
        folders: new_folders.len(),
        files: new_files.len(),
    })
}

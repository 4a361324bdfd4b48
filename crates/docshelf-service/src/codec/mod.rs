//! Serialization of a [`Library`] to its durable and backup documents.
//!
//! Both documents carry the entity maps as `[id, entity]` entry pairs with
//! binary payloads in radix-64 text. Decoding is pure: it builds a new
//! library and never touches an existing one.

pub mod backup;
pub mod durable;

use std::collections::BTreeMap;

use tracing::warn;

use docshelf_core::error::AppError;
use docshelf_core::result::AppResult;
use docshelf_core::types::{FileId, FolderId};
use docshelf_entity::{ChildRef, File, Folder, ViewMode};

use crate::tree::Library;

pub use backup::{BACKUP_VERSION, BackupContents, from_backup, to_backup};
pub use durable::{DURABLE_FORMAT_VERSION, from_durable, to_durable};

/// Collect `[id, entity]` pairs into a map, rejecting mismatched or
/// repeated ids.
pub(crate) fn collect_entries<K, V>(
    entries: Vec<(K, V)>,
    entity_id: impl Fn(&V) -> K,
    what: &str,
) -> AppResult<BTreeMap<K, V>>
where
    K: Ord + Copy + std::fmt::Display,
{
    let mut map = BTreeMap::new();
    for (key, value) in entries {
        let id = entity_id(&value);
        if id != key {
            return Err(AppError::corrupt(format!(
                "{what} entry {key} holds a record with id {id}"
            )));
        }
        if map.insert(key, value).is_some() {
            return Err(AppError::corrupt(format!("{what} {key} appears more than once")));
        }
    }
    Ok(map)
}

/// Drop child references that do not resolve. Returns how many were dropped.
pub(crate) fn drop_dangling_children(
    folders: &mut BTreeMap<FolderId, Folder>,
    files: &BTreeMap<FileId, File>,
) -> usize {
    let folder_ids: Vec<FolderId> = folders.keys().copied().collect();
    let mut dropped = 0;
    for folder in folders.values_mut() {
        let before = folder.children.len();
        folder.children.retain(|child| match child {
            ChildRef::Folder(id) => folder_ids.binary_search(id).is_ok(),
            ChildRef::File(id) => files.contains_key(id),
        });
        let removed = before - folder.children.len();
        if removed > 0 {
            warn!(folder_id = %folder.id, removed, "Dropped dangling child references");
        }
        dropped += removed;
    }
    dropped
}

/// Build a library from decoded maps, repairing dangling references and
/// then requiring every invariant to hold.
pub(crate) fn assemble(
    mut folders: BTreeMap<FolderId, Folder>,
    files: BTreeMap<FileId, File>,
    current_folder_id: Option<FolderId>,
    view_mode: ViewMode,
) -> AppResult<Library> {
    drop_dangling_children(&mut folders, &files);

    let current_folder_id = match current_folder_id {
        Some(id) if folders.contains_key(&id) => id,
        Some(id) => {
            warn!(folder_id = %id, "Current folder no longer exists, falling back to root");
            FolderId::ROOT
        }
        None => FolderId::ROOT,
    };

    let library = Library {
        folders,
        files,
        current_folder_id,
        view_mode,
    };
    library.check_invariants()?;
    Ok(library)
}

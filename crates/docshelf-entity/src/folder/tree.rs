//! Folder tree structures for hierarchical display.

use serde::{Deserialize, Serialize};

use docshelf_core::types::FolderId;

/// A node in a folder tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderNode {
    /// Folder ID.
    pub id: FolderId,
    /// Folder name.
    pub name: String,
    /// Depth level (0 for root).
    pub depth: u32,
    /// Number of direct files in this folder.
    pub file_count: usize,
    /// Child folder nodes, in display order.
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    /// Number of direct sub-folders.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Depth-first iterator over this node and all of its descendants.
    pub fn walk(&self) -> Vec<&FolderNode> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.walk());
        }
        out
    }
}

/// A complete folder tree rooted at the library root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderTree {
    /// The root node.
    pub root: FolderNode,
    /// Total number of folders in the tree, root included.
    pub total_folders: usize,
}

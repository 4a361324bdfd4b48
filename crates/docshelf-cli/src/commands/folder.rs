//! Folder management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use docshelf_core::config::AppConfig;
use docshelf_core::error::AppError;
use docshelf_core::types::FolderId;
use docshelf_entity::FolderNode;
use docshelf_service::{DeleteOptions, LibraryService};

use super::{folder_or_current, open_library, parse_folder_id};
use crate::output::{self, OutputFormat};

/// Arguments for folder commands
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Folder subcommand
    #[command(subcommand)]
    pub command: FolderCommand,
}

/// Folder subcommands
#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    /// List sub-folders
    List {
        /// Parent folder ID (defaults to the current folder)
        #[arg(short, long)]
        parent: Option<String>,
    },
    /// Create a new folder
    Create {
        /// Folder name
        name: String,
        /// Parent folder ID (defaults to the current folder)
        #[arg(short, long)]
        parent: Option<String>,
    },
    /// Rename a folder
    Rename {
        /// Folder ID
        id: String,
        /// New name
        name: String,
    },
    /// Move a folder under another folder
    Move {
        /// Folder ID
        id: String,
        /// Target folder ID
        #[arg(short, long)]
        to: String,
    },
    /// Delete a folder
    Delete {
        /// Folder ID
        id: String,
        /// Also delete everything inside it
        #[arg(long)]
        cascade: bool,
    },
    /// Make a folder the current folder
    Open {
        /// Folder ID (`root` for the root folder)
        id: String,
    },
    /// Show the path from the root to a folder
    Path {
        /// Folder ID (defaults to the current folder)
        id: Option<String>,
    },
    /// Show the folder tree
    Tree,
}

/// Folder display row
#[derive(Debug, Serialize, Tabled)]
struct FolderRow {
    /// Folder ID
    id: String,
    /// Name
    name: String,
    /// Direct files
    files: usize,
    /// Sub-folders
    folders: usize,
    /// Created at
    created_at: String,
}

/// Execute folder commands
pub async fn execute(
    args: &FolderArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut library = open_library(config).await?;

    match &args.command {
        FolderCommand::List { parent } => {
            let parent_id = folder_or_current(&library, parent.as_deref())?;
            let lib = library.library();
            let rows: Vec<FolderRow> = lib
                .list_folders(parent_id)
                .iter()
                .map(|f| FolderRow {
                    id: f.id.to_string(),
                    name: f.name.clone(),
                    files: lib.file_count(f.id),
                    folders: f.folder_ids().count(),
                    created_at: f.created_at.format("%Y-%m-%d %H:%M").to_string(),
                })
                .collect();

            output::print_list(&rows, format);
        }
        FolderCommand::Create { name, parent } => {
            let parent_id = folder_or_current(&library, parent.as_deref())?;
            let id = library.create_folder(parent_id, name).await?;
            output::print_success(&format!("Folder '{}' created (id: {id})", name.trim()));
        }
        FolderCommand::Rename { id, name } => {
            let id = parse_folder_id(id)?;
            library.rename_folder(id, name).await?;
            output::print_success(&format!("Folder renamed to '{}'", name.trim()));
        }
        FolderCommand::Move { id, to } => {
            let id = parse_folder_id(id)?;
            let target = parse_folder_id(to)?;
            library.move_folder(id, target).await?;
            output::print_success("Folder moved");
        }
        FolderCommand::Delete { id, cascade } => {
            let id = parse_folder_id(id)?;
            let counts = library
                .delete_folder(id, DeleteOptions { cascade: *cascade })
                .await?;
            output::print_success(&format!(
                "Deleted {} folder(s) and {} file(s)",
                counts.folders, counts.files
            ));
        }
        FolderCommand::Open { id } => {
            let id = parse_folder_id(id)?;
            library.set_current_folder(id).await?;
            let path = breadcrumb(&library, id);
            output::print_success(&format!("Now in {path}"));
        }
        FolderCommand::Path { id } => {
            let id = folder_or_current(&library, id.as_deref())?;
            match format {
                OutputFormat::Json => {
                    let names: Vec<&str> = library
                        .library()
                        .folder_path(id)
                        .iter()
                        .map(|f| f.name.as_str())
                        .collect();
                    output::print_item(&names, format);
                }
                OutputFormat::Table => println!("{}", breadcrumb(&library, id)),
            }
        }
        FolderCommand::Tree => {
            let tree = library.library().folder_tree();
            match format {
                OutputFormat::Json => output::print_item(&tree, format),
                OutputFormat::Table => print_node(&tree.root),
            }
        }
    }

    Ok(())
}

fn breadcrumb(library: &LibraryService, id: FolderId) -> String {
    library
        .library()
        .folder_path(id)
        .iter()
        .map(|f| f.name.as_str())
        .collect::<Vec<_>>()
        .join(" / ")
}

fn print_node(node: &FolderNode) {
    let indent = "  ".repeat(node.depth as usize);
    println!("{indent}├── {}/ ({} files)", node.name, node.file_count);
    for child in &node.children {
        print_node(child);
    }
}

//! File management CLI commands.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use docshelf_core::config::AppConfig;
use docshelf_core::error::{AppError, ErrorKind};
use docshelf_entity::file::sniff_mime_type;
use docshelf_entity::UploadCandidate;
use docshelf_service::{Notice, UploadService};

use super::{folder_or_current, open_library, parse_file_id, parse_folder_id};
use crate::output::{self, OutputFormat};

/// Arguments for file commands
#[derive(Debug, Args)]
pub struct FileArgs {
    /// File subcommand
    #[command(subcommand)]
    pub command: FileCommand,
}

/// File subcommands
#[derive(Debug, Subcommand)]
pub enum FileCommand {
    /// Add PDF files from disk
    Add {
        /// Paths of the files to add
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Target folder ID (defaults to the current folder)
        #[arg(short, long)]
        folder: Option<String>,
    },
    /// List files in a folder
    List {
        /// Folder ID (defaults to the current folder)
        #[arg(short, long)]
        folder: Option<String>,
        /// Only show names containing this text
        #[arg(short = 'q', long)]
        filter: Option<String>,
    },
    /// Rename a file
    Rename {
        /// File ID
        id: String,
        /// New name; `.pdf` is appended when missing
        name: String,
    },
    /// Move a file to another folder
    Move {
        /// File ID
        id: String,
        /// Target folder ID
        #[arg(short, long)]
        to: String,
    },
    /// Delete a file
    Delete {
        /// File ID
        id: String,
    },
    /// Write a stored file back to disk
    Download {
        /// File ID
        id: String,
        /// Output path (defaults to the file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// File display row
#[derive(Debug, Serialize, Tabled)]
struct FileRow {
    /// File ID
    id: String,
    /// Name
    name: String,
    /// Size
    size: String,
    /// Has thumbnail
    thumbnail: bool,
    /// Uploaded at
    uploaded: String,
}

/// Execute file commands
pub async fn execute(
    args: &FileArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut library = open_library(config).await?;

    match &args.command {
        FileCommand::Add { paths, folder } => {
            let folder_id = folder_or_current(&library, folder.as_deref())?;
            let mut candidates = Vec::with_capacity(paths.len());
            for path in paths {
                candidates.push(read_candidate(path).await?);
            }

            let uploads = UploadService::new(&config.library, None);
            let report = uploads
                .upload_batch(&mut library, folder_id, candidates)
                .await;

            for outcome in &report.outcomes {
                let notice = match &outcome.result {
                    Ok(id) => Notice::success(format!("Added '{}' (id: {id})", outcome.name)),
                    Err(e) => Notice::from(e),
                };
                output::print_notice(&notice);
            }
            output::print_notice(&Notice::info(format!(
                "{} of {} file(s) added",
                report.admitted().len(),
                report.outcomes.len()
            )));
            if !report.all_admitted() {
                return Err(AppError::new(
                    ErrorKind::OversizeOrWrongType,
                    format!(
                        "{} of {} file(s) were not added",
                        report.rejected().len(),
                        report.outcomes.len()
                    ),
                ));
            }
        }
        FileCommand::List { folder, filter } => {
            let folder_id = folder_or_current(&library, folder.as_deref())?;
            let rows: Vec<FileRow> = library
                .library()
                .list_files(folder_id, filter.as_deref())
                .iter()
                .map(|f| FileRow {
                    id: f.id.to_string(),
                    name: f.name.clone(),
                    size: output::human_bytes(f.size),
                    thumbnail: f.thumbnail.is_some(),
                    uploaded: f.upload_date.format("%Y-%m-%d %H:%M").to_string(),
                })
                .collect();

            output::print_list(&rows, format);
        }
        FileCommand::Rename { id, name } => {
            let id = parse_file_id(id)?;
            library.rename_file(id, name).await?;
            output::print_success("File renamed");
        }
        FileCommand::Move { id, to } => {
            let id = parse_file_id(id)?;
            let target = parse_folder_id(to)?;
            library.move_file(id, target).await?;
            output::print_success("File moved");
        }
        FileCommand::Delete { id } => {
            let id = parse_file_id(id)?;
            library.delete_file(id).await?;
            output::print_success("File deleted");
        }
        FileCommand::Download { id, output: out_path } => {
            let id = parse_file_id(id)?;
            let download = library.download_file(id)?;
            let path = match out_path {
                Some(path) => path.clone(),
                None => default_download_path(&download.name)?,
            };

            tokio::fs::write(&path, &download.data).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to write {}", path.display()),
                    e,
                )
            })?;
            output::print_success(&format!(
                "Wrote '{}' ({})",
                path.display(),
                output::human_bytes(download.data.len() as u64)
            ));
        }
    }

    Ok(())
}

/// Where a download lands without `--output`: the final component of the
/// stored name, inside the working directory.
fn default_download_path(name: &str) -> Result<PathBuf, AppError> {
    Path::new(name)
        .file_name()
        .map(PathBuf::from)
        .ok_or_else(|| {
            AppError::validation(format!(
                "'{name}' is not usable as a file name; pass --output"
            ))
        })
}

/// Read a file from disk into an upload candidate.
async fn read_candidate(path: &Path) -> Result<UploadCandidate, AppError> {
    let data = tokio::fs::read(path).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::NotFound,
            format!("Failed to read {}", path.display()),
            e,
        )
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.pdf".to_string());
    let mime = sniff_mime_type(&name, &data);
    Ok(UploadCandidate::new(name, mime, data.into()))
}

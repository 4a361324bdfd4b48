//! Backup export and import CLI commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use docshelf_core::config::AppConfig;
use docshelf_core::error::{AppError, ErrorKind};
use docshelf_service::ImportMode;

use super::open_library;
use crate::output;

/// Arguments for backup commands
#[derive(Debug, Args)]
pub struct BackupArgs {
    /// Backup subcommand
    #[command(subcommand)]
    pub command: BackupCommand,
}

/// Backup subcommands
#[derive(Debug, Subcommand)]
pub enum BackupCommand {
    /// Write the whole library to a JSON backup file
    Export {
        /// Output path
        #[arg(short, long, default_value = "docshelf-backup.json")]
        output: PathBuf,
    },
    /// Load a JSON backup file into the library
    Import {
        /// Backup file path
        path: PathBuf,
        /// `replace` discards the current library, `merge` keeps it
        #[arg(short, long, default_value = "replace")]
        mode: ImportMode,
    },
}

/// Execute backup commands
pub async fn execute(args: &BackupArgs, config: &AppConfig) -> Result<(), AppError> {
    let mut library = open_library(config).await?;

    match &args.command {
        BackupCommand::Export { output: out_path } => {
            let data = library.export_backup()?;
            tokio::fs::write(out_path, &data).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to write {}", out_path.display()),
                    e,
                )
            })?;

            let stats = library.library().stats();
            output::print_success(&format!(
                "Exported {} folder(s) and {} file(s) to '{}'",
                stats.folder_count,
                stats.file_count,
                out_path.display()
            ));
        }
        BackupCommand::Import { path, mode } => {
            let data = tokio::fs::read(path).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::NotFound,
                    format!("Failed to read {}", path.display()),
                    e,
                )
            })?;

            let summary = library.import_backup(&data, *mode).await?;
            output::print_success(&format!(
                "Imported {} folder(s) and {} file(s) ({mode:?})",
                summary.folders, summary.files
            ));
        }
    }

    Ok(())
}

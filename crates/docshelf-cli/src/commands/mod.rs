//! CLI command definitions and dispatch.

pub mod backup;
pub mod config;
pub mod file;
pub mod folder;
pub mod library;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::debug;

use docshelf_core::config::AppConfig;
use docshelf_core::error::AppError;
use docshelf_core::types::{FileId, FolderId, UuidV7Generator};
use docshelf_service::{LibraryService, PersistenceGateway};

use crate::output::OutputFormat;

/// DocShelf: a personal PDF library
#[derive(Debug, Parser)]
#[command(name = "docshelf", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Folder management
    Folder(folder::FolderArgs),
    /// File management
    File(file::FileArgs),
    /// Export and import backups
    Backup(backup::BackupArgs),
    /// Library-wide information and maintenance
    Library(library::LibraryArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Folder(args) => folder::execute(args, &config, self.format).await,
            Commands::File(args) => file::execute(args, &config, self.format).await,
            Commands::Backup(args) => backup::execute(args, &config).await,
            Commands::Library(args) => library::execute(args, &config, self.format).await,
            Commands::Config(args) => config::execute(args, &config, &self.config, self.format).await,
        }
    }
}

/// Helper: open the library described by the configuration
pub async fn open_library(config: &AppConfig) -> Result<LibraryService, AppError> {
    debug!(
        provider = %config.storage.provider,
        key = %config.library.storage_key,
        "Opening library"
    );
    let store = docshelf_storage::open_store(&config.storage).await?;
    let gateway = PersistenceGateway::new(store, &config.library);
    Ok(LibraryService::open(gateway, Arc::new(UuidV7Generator), config.library.clone()).await)
}

/// Helper: parse a folder id; `root` names the root folder
pub fn parse_folder_id(raw: &str) -> Result<FolderId, AppError> {
    if raw.eq_ignore_ascii_case("root") {
        return Ok(FolderId::ROOT);
    }
    raw.parse()
        .map_err(|e| AppError::validation(format!("Invalid folder id '{raw}': {e}")))
}

/// Helper: parse a file id
pub fn parse_file_id(raw: &str) -> Result<FileId, AppError> {
    raw.parse()
        .map_err(|e| AppError::validation(format!("Invalid file id '{raw}': {e}")))
}

/// Helper: the folder to act on, defaulting to the current folder
pub fn folder_or_current(
    library: &LibraryService,
    raw: Option<&str>,
) -> Result<FolderId, AppError> {
    match raw {
        Some(raw) => parse_folder_id(raw),
        None => Ok(library.library().current_folder_id()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_folder_id_accepts_root_alias() {
        assert_eq!(parse_folder_id("ROOT").unwrap(), FolderId::ROOT);
        assert!(parse_folder_id("nope").is_err());
    }

    #[test]
    fn test_cli_parses_nested_commands() {
        let cli = Cli::try_parse_from(["docshelf", "-f", "json", "folder", "tree"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Folder(_)));
    }
}

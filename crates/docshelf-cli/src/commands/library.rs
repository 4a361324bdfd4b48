//! Library-wide CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;

use docshelf_core::config::AppConfig;
use docshelf_core::error::AppError;
use docshelf_entity::ViewMode;

use super::open_library;
use crate::output::{self, OutputFormat};

/// Arguments for library commands
#[derive(Debug, Args)]
pub struct LibraryArgs {
    /// Library subcommand
    #[command(subcommand)]
    pub command: LibraryCommand,
}

/// Library subcommands
#[derive(Debug, Subcommand)]
pub enum LibraryCommand {
    /// Show library statistics and store usage
    Stats,
    /// Set the preferred view mode
    View {
        /// `grid` or `list`
        mode: ViewMode,
    },
    /// Delete every folder and file
    Clear {
        /// Skip the safety check
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Serialize)]
struct StatsReport {
    backend: String,
    folders: usize,
    files: usize,
    total_bytes: u64,
    thumbnails: usize,
    used_bytes: u64,
    quota_bytes: Option<u64>,
    view_mode: ViewMode,
}

/// Execute library commands
pub async fn execute(
    args: &LibraryArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut library = open_library(config).await?;

    match &args.command {
        LibraryCommand::Stats => {
            let stats = library.library().stats();
            let usage = library.usage().await?;
            let report = StatsReport {
                backend: config.storage.provider.clone(),
                folders: stats.folder_count,
                files: stats.file_count,
                total_bytes: stats.total_bytes,
                thumbnails: stats.thumbnail_count,
                used_bytes: usage.used_bytes,
                quota_bytes: usage.quota_bytes,
                view_mode: library.library().view_mode(),
            };

            match format {
                OutputFormat::Json => output::print_item(&report, format),
                OutputFormat::Table => {
                    println!("Library statistics:");
                    output::print_kv("Store", &report.backend);
                    output::print_kv("Folders", &report.folders.to_string());
                    output::print_kv("Files", &report.files.to_string());
                    output::print_kv("Document bytes", &output::human_bytes(report.total_bytes));
                    output::print_kv("Thumbnails", &report.thumbnails.to_string());
                    output::print_kv("View mode", report.view_mode.as_str());
                    let quota = report
                        .quota_bytes
                        .map(output::human_bytes)
                        .unwrap_or_else(|| "unlimited".to_string());
                    output::print_kv(
                        "Store usage",
                        &format!("{} of {quota}", output::human_bytes(report.used_bytes)),
                    );
                }
            }
        }
        LibraryCommand::View { mode } => {
            library.set_view_mode(*mode).await?;
            output::print_success(&format!("View mode set to {mode}"));
        }
        LibraryCommand::Clear { yes } => {
            if !yes {
                output::print_warning("This deletes every folder and file. Re-run with --yes.");
                return Ok(());
            }
            library.clear().await?;
            output::print_success("Library cleared");
        }
    }

    Ok(())
}

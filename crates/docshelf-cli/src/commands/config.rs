//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use docshelf_core::config::AppConfig;
use docshelf_core::error::{AppError, ErrorKind};

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Validate configuration file
    Validate,
    /// Generate a default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config/generated.toml")]
        output: String,
    },
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config: &AppConfig,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            output::print_item(config, format);
        }
        ConfigCommand::Validate => {
            config.validate()?;
            output::print_success(&format!("Configuration '{config_path}' is valid"));
            output::print_kv("Store", &config.storage.provider);
            output::print_kv("Data directory", &config.storage.data_dir);
            output::print_kv("Storage key", &config.library.storage_key);
            output::print_kv(
                "Max file size",
                &output::human_bytes(config.library.max_file_size_bytes),
            );
        }
        ConfigCommand::Generate { output: out_path } => {
            let default_config = include_str!("../../../../config/default.toml");

            if let Some(parent) = std::path::Path::new(out_path).parent() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::with_source(ErrorKind::Storage, "Failed to create directory", e)
                })?;
            }

            tokio::fs::write(out_path, default_config).await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to write config", e)
            })?;

            output::print_success(&format!("Default config written to '{out_path}'"));
        }
    }

    Ok(())
}


//! DocShelf CLI entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use docshelf_core::config::AppConfig;
use docshelf_core::config::logging::{LogFormat, LoggingConfig};
use docshelf_service::Notice;

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            init_logging(&LoggingConfig::default());
            output::print_error(&format!("Configuration invalid: {e}"));
            std::process::exit(1);
        }
    };
    init_logging(&config.logging);

    if let Err(e) = cli.execute(config).await {
        output::print_notice(&Notice::from(&e));
        std::process::exit(1);
    }
}

/// Install the tracing subscriber. `RUST_LOG` overrides the configured level.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_target(config.with_target)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(config.with_target)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field has a default so an absent file is valid.

pub mod library;
pub mod logging;
pub mod storage;
pub mod viewer;

use serde::{Deserialize, Serialize};

use self::library::LibraryConfig;
use self::logging::LoggingConfig;
use self::storage::StorageConfig;
use self::viewer::{ThumbnailConfig, ViewerConfig};

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "DOCSHELF";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Library (tree store) settings.
    #[serde(default)]
    pub library: LibraryConfig,
    /// Durable key-value store settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Document viewer settings.
    #[serde(default)]
    pub viewer: ViewerConfig,
    /// Thumbnail generation settings.
    #[serde(default)]
    pub thumbnail: ThumbnailConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from an optional TOML file.
    ///
    /// The file at `path` is merged with environment variables prefixed
    /// with `DOCSHELF__` (e.g. `DOCSHELF__STORAGE__QUOTA_BYTES`). A missing
    /// file yields the defaults.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject settings that would make the library unusable.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.library.storage_key.trim().is_empty() {
            return Err(AppError::configuration("library.storage_key cannot be empty"));
        }
        if self.library.root_name.trim().is_empty() {
            return Err(AppError::configuration("library.root_name cannot be empty"));
        }
        let v = &self.viewer;
        if !(v.min_zoom > 0.0 && v.min_zoom <= v.max_zoom) {
            return Err(AppError::configuration(
                "viewer.min_zoom must be positive and not above viewer.max_zoom",
            ));
        }
        if v.zoom_step <= 0.0 {
            return Err(AppError::configuration("viewer.zoom_step must be positive"));
        }
        if self.thumbnail.max_edge_px == 0 {
            return Err(AppError::configuration("thumbnail.max_edge_px must be positive"));
        }
        Ok(())
    }
}

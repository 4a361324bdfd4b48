//! Library (tree store) configuration.

use serde::{Deserialize, Serialize};

/// Largest PDF the upload pipeline admits by default (50 MiB).
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 52_428_800;

/// Settings for the document library itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Key under which the serialized library is stored.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Maximum accepted size of a single uploaded PDF in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
    /// Display name of the root folder.
    #[serde(default = "default_root_name")]
    pub root_name: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            max_file_size_bytes: default_max_file_size(),
            root_name: default_root_name(),
        }
    }
}

fn default_storage_key() -> String {
    "docshelf.library".to_string()
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE_BYTES
}

fn default_root_name() -> String {
    "My Documents".to_string()
}

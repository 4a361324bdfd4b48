//! Durable store configuration.

use serde::{Deserialize, Serialize};

/// Key-value store selection and limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend to use: `"file"` or `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Directory holding the file backend's values.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Total bytes the store may hold; `None` means unbounded.
    #[serde(default = "default_quota")]
    pub quota_bytes: Option<u64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            data_dir: default_data_dir(),
            quota_bytes: default_quota(),
        }
    }
}

fn default_provider() -> String {
    "file".to_string()
}

fn default_data_dir() -> String {
    "./data/docshelf".to_string()
}

fn default_quota() -> Option<u64> {
    Some(1_073_741_824) // 1 GiB
}

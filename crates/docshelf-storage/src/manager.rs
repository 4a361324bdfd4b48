//! Storage selection: opens the key-value backend named in configuration.

use std::sync::Arc;

use tracing::info;

use docshelf_cache::MemoryKvStore;
use docshelf_core::config::storage::StorageConfig;
use docshelf_core::error::AppError;
use docshelf_core::result::AppResult;
use docshelf_core::traits::kv::KeyValueStore;

use crate::providers::FileKvStore;

/// Open the backend selected by `config.provider`.
///
/// `"file"` persists under `config.data_dir`; `"memory"` keeps values for
/// the lifetime of the process.
pub async fn open_store(config: &StorageConfig) -> AppResult<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match config.provider.as_str() {
        "file" => Arc::new(FileKvStore::new(&config.data_dir, config.quota_bytes).await?),
        "memory" => match config.quota_bytes {
            Some(quota) => Arc::new(MemoryKvStore::with_quota(quota)),
            None => Arc::new(MemoryKvStore::new()),
        },
        other => {
            return Err(AppError::configuration(format!(
                "Unknown storage provider: '{other}'"
            )));
        }
    };

    info!(
        backend = store.backend(),
        quota_bytes = ?config.quota_bytes,
        "Opened key-value store"
    );
    Ok(store)
}

//! In-memory key-value store with a byte quota.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tracing::debug;

use docshelf_core::error::AppError;
use docshelf_core::result::AppResult;
use docshelf_core::traits::kv::{KeyValueStore, StoreUsage};

/// In-memory key-value store.
///
/// Usage counts value bytes only, the same measure as the file-backed
/// store. A `set` that would push usage past the
/// quota is rejected and the previous value stays in place.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    /// Stored values.
    entries: Arc<DashMap<String, Bytes>>,
    /// Maximum total bytes, `None` for unbounded.
    quota_bytes: Option<u64>,
}

impl MemoryKvStore {
    /// Create an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that holds at most `quota_bytes` bytes.
    pub fn with_quota(quota_bytes: u64) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Bytes used by every entry except `skip_key`.
    fn used_excluding(&self, skip_key: Option<&str>) -> u64 {
        self.entries
            .iter()
            .filter(|entry| Some(entry.key().as_str()) != skip_key)
            .map(|entry| entry.value().len() as u64)
            .sum()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    fn backend(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> AppResult<Option<Bytes>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: Bytes) -> AppResult<()> {
        if let Some(quota) = self.quota_bytes {
            // Not atomic across concurrent writers; the library writes from a single flow.
            let projected = self.used_excluding(Some(key)) + value.len() as u64;
            if projected > quota {
                return Err(AppError::capacity_exceeded(format!(
                    "Storing '{key}' needs {projected} bytes but the quota is {quota} bytes"
                )));
            }
        }
        debug!(key, bytes = value.len(), "Stored value in memory");
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.entries.contains_key(key))
    }

    async fn usage(&self) -> AppResult<StoreUsage> {
        Ok(StoreUsage {
            used_bytes: self.used_excluding(None),
            quota_bytes: self.quota_bytes,
        })
    }
}

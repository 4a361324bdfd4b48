//! Durable key-value store trait for pluggable persistence backends.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Byte usage reported by a key-value store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StoreUsage {
    /// Bytes held by all stored values. Keys and backend overhead are not
    /// counted.
    pub used_bytes: u64,
    /// Maximum bytes the store accepts, `None` when unbounded.
    pub quota_bytes: Option<u64>,
}

/// Trait for durable key-value backends (local filesystem, in-memory).
///
/// Writes are all-or-nothing: a `set` that fails, including one rejected
/// with [`ErrorKind::CapacityExceeded`](crate::error::ErrorKind::CapacityExceeded),
/// leaves the previous value for that key readable and unchanged.
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend name (e.g., "file", "memory").
    fn backend(&self) -> &str;

    /// Get a value by key. Returns `None` if the key does not exist.
    async fn get(&self, key: &str) -> AppResult<Option<Bytes>>;

    /// Store a value, replacing any previous value for the key.
    async fn set(&self, key: &str, value: Bytes) -> AppResult<()>;

    /// Remove a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> AppResult<()>;

    /// Check whether a key exists in the store.
    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Report the current byte usage and quota.
    async fn usage(&self) -> AppResult<StoreUsage>;
}

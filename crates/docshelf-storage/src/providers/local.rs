//! Local filesystem key-value store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use docshelf_core::error::{AppError, ErrorKind};
use docshelf_core::result::AppResult;
use docshelf_core::traits::kv::{KeyValueStore, StoreUsage};

/// Extension of committed value files.
const VALUE_EXT: &str = "val";

/// Extension of in-flight writes.
const TEMP_EXT: &str = "tmp";

/// Key-value store keeping one file per key under a root directory.
///
/// Writes go to a temporary sibling and are renamed into place, so a failed
/// `set` never leaves a truncated value behind. Usage counts the bytes of
/// committed value files.
#[derive(Debug, Clone)]
pub struct FileKvStore {
    /// Directory holding the value files.
    root: PathBuf,
    /// Maximum total bytes, `None` for unbounded.
    quota_bytes: Option<u64>,
}

impl FileKvStore {
    /// Open a store rooted at `root_path`, creating the directory if needed.
    pub async fn new(root_path: &str, quota_bytes: Option<u64>) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root, quota_bytes })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key to its value file.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        if key.is_empty() {
            return Err(AppError::validation("Storage key must not be empty"));
        }
        Ok(self.root.join(format!("{}.{VALUE_EXT}", encode_key(key))))
    }

    /// Bytes held by every committed value except `skip`.
    async fn used_excluding(&self, skip: Option<&Path>) -> AppResult<u64> {
        let mut dir = fs::read_dir(&self.root).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to list storage root", e)
        })?;

        let mut used = 0u64;
        while let Some(entry) = dir.next_entry().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to read directory entry", e)
        })? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(VALUE_EXT) {
                continue;
            }
            if skip == Some(path.as_path()) {
                continue;
            }
            let meta = entry.metadata().await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to get entry metadata", e)
            })?;
            used += meta.len();
        }
        Ok(used)
    }

    /// Write `value` to a temporary file and rename it over `target`.
    async fn write_atomic(&self, target: &Path, value: &[u8]) -> AppResult<()> {
        let temp = target.with_extension(TEMP_EXT);
        let result = async {
            let mut file = fs::File::create(&temp).await?;
            file.write_all(value).await?;
            file.flush().await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&temp, target).await
        }
        .await;

        if let Err(e) = result {
            if let Err(cleanup) = fs::remove_file(&temp).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %temp.display(), error = %cleanup, "Failed to remove temporary file");
                }
            }
            return Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write {}", target.display()),
                e,
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileKvStore {
    fn backend(&self) -> &str {
        "file"
    }

    async fn get(&self, key: &str) -> AppResult<Option<Bytes>> {
        let path = self.resolve(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read value for '{key}'"),
                e,
            )),
        }
    }

    async fn set(&self, key: &str, value: Bytes) -> AppResult<()> {
        let path = self.resolve(key)?;

        if let Some(quota) = self.quota_bytes {
            let projected = self.used_excluding(Some(&path)).await? + value.len() as u64;
            if projected > quota {
                return Err(AppError::capacity_exceeded(format!(
                    "Storing '{key}' needs {projected} bytes but the quota is {quota} bytes"
                )));
            }
        }

        self.write_atomic(&path, &value).await?;
        debug!(key, bytes = value.len(), "Stored value on disk");
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to remove value for '{key}'"),
                e,
            )),
        }
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.resolve(key)?.exists())
    }

    async fn usage(&self) -> AppResult<StoreUsage> {
        Ok(StoreUsage {
            used_bytes: self.used_excluding(None).await?,
            quota_bytes: self.quota_bytes,
        })
    }
}

/// Turn an arbitrary key into a portable file name.
///
/// ASCII alphanumerics, `-` and `.` pass through; every other byte becomes
/// `_` followed by two hex digits.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'.' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("_{byte:02x}"));
        }
    }
    out
}

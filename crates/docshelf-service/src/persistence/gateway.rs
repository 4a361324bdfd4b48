//! Persistence gateway: the only code that reads or writes the durable
//! library document.

use std::sync::Arc;

use tracing::{debug, info, warn};

use docshelf_core::config::library::LibraryConfig;
use docshelf_core::result::AppResult;
use docshelf_core::traits::kv::{KeyValueStore, StoreUsage};

use crate::codec::{from_durable, to_durable};
use crate::tree::Library;

/// Saves and loads a [`Library`] under one fixed key.
#[derive(Debug, Clone)]
pub struct PersistenceGateway {
    /// Backing key-value store.
    store: Arc<dyn KeyValueStore>,
    /// Key holding the durable document.
    key: String,
    /// Root folder name used for fresh libraries.
    root_name: String,
}

impl PersistenceGateway {
    /// Creates a new persistence gateway.
    pub fn new(store: Arc<dyn KeyValueStore>, config: &LibraryConfig) -> Self {
        Self {
            store,
            key: config.storage_key.clone(),
            root_name: config.root_name.clone(),
        }
    }

    /// The storage key in use.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// A library holding only the root folder.
    pub fn fresh(&self) -> Library {
        Library::new(&self.root_name)
    }

    /// Serialize and store `library`.
    ///
    /// A `CapacityExceeded` failure leaves the previously stored document in
    /// place.
    pub async fn save(&self, library: &Library) -> AppResult<()> {
        let bytes = to_durable(library)?;
        let len = bytes.len();
        self.store.set(&self.key, bytes).await?;
        debug!(key = %self.key, bytes = len, "Saved library");
        Ok(())
    }

    /// Load the stored library.
    ///
    /// Never fails: a missing key, an unreadable store or a corrupt document
    /// all yield a fresh root-only library.
    pub async fn load(&self) -> Library {
        let bytes = match self.store.get(&self.key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                info!(key = %self.key, "No stored library, starting fresh");
                return self.fresh();
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read stored library, starting fresh");
                return self.fresh();
            }
        };

        match from_durable(&bytes) {
            Ok(library) => {
                info!(
                    key = %self.key,
                    folders = library.folders().len(),
                    files = library.files().len(),
                    "Loaded library"
                );
                library
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Stored library is corrupt, starting fresh");
                self.fresh()
            }
        }
    }

    /// Remove the stored document and return a fresh library.
    pub async fn clear(&self) -> AppResult<Library> {
        self.store.remove(&self.key).await?;
        info!(key = %self.key, "Cleared stored library");
        Ok(self.fresh())
    }

    /// Byte usage of the backing store.
    pub async fn usage(&self) -> AppResult<StoreUsage> {
        self.store.usage().await
    }
}

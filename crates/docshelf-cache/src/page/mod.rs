//! Cache of rendered page rasters using moka.

use std::sync::Arc;

use moka::future::Cache;
use tracing::debug;

use docshelf_core::traits::renderer::PageRaster;
use docshelf_core::types::FileId;

/// Identifies one rendering of one page.
///
/// The scale is stored in hundredths so the key stays hashable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageKey {
    /// The file the page belongs to.
    pub file_id: FileId,
    /// 1-based page number.
    pub page: u32,
    /// Render scale times 100, rounded.
    pub scale_hundredths: u32,
}

impl PageKey {
    /// Build a key for `page` of `file_id` rendered at `scale`.
    pub fn new(file_id: FileId, page: u32, scale: f32) -> Self {
        Self {
            file_id,
            page,
            scale_hundredths: (scale * 100.0).round().max(0.0) as u32,
        }
    }
}

/// Bounded in-memory cache of rendered pages.
#[derive(Debug, Clone)]
pub struct PageCache {
    /// The underlying moka cache.
    cache: Cache<PageKey, Arc<PageRaster>>,
}

impl PageCache {
    /// Create a cache holding at most `max_pages` rasters.
    pub fn new(max_pages: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(max_pages).build(),
        }
    }

    /// Look up a rendered page.
    pub async fn get(&self, key: &PageKey) -> Option<Arc<PageRaster>> {
        self.cache.get(key).await
    }

    /// Store a rendered page.
    pub async fn insert(&self, key: PageKey, raster: Arc<PageRaster>) {
        self.cache.insert(key, raster).await;
    }

    /// Drop every cached page of `file_id`.
    pub async fn invalidate_file(&self, file_id: FileId) -> u64 {
        let keys: Vec<PageKey> = self
            .cache
            .iter()
            .filter(|entry| entry.0.file_id == file_id)
            .map(|entry| *entry.0)
            .collect();

        let mut count = 0u64;
        for key in keys {
            self.cache.remove(&key).await;
            count += 1;
        }
        debug!(%file_id, count, "Invalidated cached pages");
        count
    }
}

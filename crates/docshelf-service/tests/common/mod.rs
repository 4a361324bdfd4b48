#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;

use docshelf_cache::MemoryKvStore;
use docshelf_core::config::library::LibraryConfig;
use docshelf_core::error::AppError;
use docshelf_core::result::AppResult;
use docshelf_core::traits::kv::KeyValueStore;
use docshelf_core::traits::renderer::{DocumentHandle, PageRaster, PdfRenderer};
use docshelf_core::types::SequentialIdGenerator;
use docshelf_service::{LibraryService, PersistenceGateway};

/// Renderer that accepts anything starting with `%PDF` and paints solid
/// pages. The page count is the number of `/Page` markers, at least one.
#[derive(Debug, Default)]
pub struct FakeRenderer {
    next_token: AtomicU64,
    pub renders: AtomicUsize,
    pub closes: AtomicUsize,
}

impl FakeRenderer {
    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PdfRenderer for FakeRenderer {
    async fn open(&self, data: Bytes) -> AppResult<DocumentHandle> {
        if !data.starts_with(b"%PDF") {
            return Err(AppError::invalid_pdf("Missing %PDF header"));
        }
        let pages = data.windows(5).filter(|w| *w == *b"/Page").count().max(1);
        Ok(DocumentHandle {
            token: self.next_token.fetch_add(1, Ordering::SeqCst),
            page_count: pages as u32,
        })
    }

    async fn render_page(
        &self,
        handle: &DocumentHandle,
        page_number: u32,
        scale: f32,
    ) -> AppResult<PageRaster> {
        if page_number == 0 || page_number > handle.page_count {
            return Err(AppError::validation(format!("No page {page_number}")));
        }
        self.renders.fetch_add(1, Ordering::SeqCst);
        let width = (100.0 * scale).max(1.0) as u32;
        let height = (140.0 * scale).max(1.0) as u32;
        Ok(PageRaster {
            width,
            height,
            pixels: vec![255; (width * height * 4) as usize],
        })
    }

    async fn close(&self, _handle: &DocumentHandle) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Renderer that opens documents but fails every render.
#[derive(Debug, Default)]
pub struct BrokenRenderer;

#[async_trait]
impl PdfRenderer for BrokenRenderer {
    async fn open(&self, _data: Bytes) -> AppResult<DocumentHandle> {
        Ok(DocumentHandle {
            token: 0,
            page_count: 1,
        })
    }

    async fn render_page(
        &self,
        _handle: &DocumentHandle,
        _page_number: u32,
        _scale: f32,
    ) -> AppResult<PageRaster> {
        Err(AppError::internal("Rasterizer crashed"))
    }
}

/// A small PDF-looking payload with `pages` pages.
pub fn pdf_bytes(pages: usize) -> Bytes {
    let mut data = b"%PDF-1.7\n".to_vec();
    for _ in 0..pages {
        data.extend_from_slice(b"<< /Type /Page >>\n");
    }
    Bytes::from(data)
}

pub async fn open_service(store: Arc<dyn KeyValueStore>) -> LibraryService {
    let config = LibraryConfig::default();
    let gateway = PersistenceGateway::new(store, &config);
    LibraryService::open(gateway, Arc::new(SequentialIdGenerator::new()), config).await
}

pub async fn memory_service() -> (MemoryKvStore, LibraryService) {
    let store = MemoryKvStore::new();
    let service = open_service(Arc::new(store.clone())).await;
    (store, service)
}

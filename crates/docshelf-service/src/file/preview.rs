//! Document viewer: pagination and zoom over a PDF renderer.

use std::sync::Arc;

use tracing::{debug, info};

use docshelf_cache::{PageCache, PageKey};
use docshelf_core::config::viewer::ViewerConfig;
use docshelf_core::error::AppError;
use docshelf_core::result::AppResult;
use docshelf_core::traits::renderer::{DocumentHandle, PageRaster, PdfRenderer};
use docshelf_core::types::FileId;
use docshelf_entity::File;

/// The document currently shown.
#[derive(Debug, Clone)]
struct OpenDocument {
    file_id: FileId,
    name: String,
    handle: DocumentHandle,
    page: u32,
}

/// Viewer state for one document at a time.
///
/// Pages are 1-based and always within `[1, page_count]`. Zoom always stays
/// within the configured range.
#[derive(Debug)]
pub struct ViewerSession {
    /// Rendering engine.
    renderer: Arc<dyn PdfRenderer>,
    /// Rendered pages.
    cache: PageCache,
    /// Zoom limits and defaults.
    config: ViewerConfig,
    /// Current document, if any.
    document: Option<OpenDocument>,
    /// Current zoom factor.
    zoom: f32,
}

impl ViewerSession {
    /// Creates a new viewer session with nothing open.
    pub fn new(renderer: Arc<dyn PdfRenderer>, config: ViewerConfig) -> Self {
        let cache = PageCache::new(config.page_cache_capacity);
        let zoom = config.default_zoom.clamp(config.min_zoom, config.max_zoom);
        Self {
            renderer,
            cache,
            config,
            document: None,
            zoom,
        }
    }

    /// Open `file`, replacing any document already open.
    ///
    /// If the renderer rejects the bytes the previous document stays open.
    pub async fn open(&mut self, file: &File) -> AppResult<u32> {
        let handle = self.renderer.open(file.payload.clone()).await?;
        if handle.page_count == 0 {
            self.renderer.close(&handle).await;
            return Err(AppError::invalid_pdf(format!("'{}' has no pages", file.name)));
        }

        self.close().await;
        self.document = Some(OpenDocument {
            file_id: file.id,
            name: file.name.clone(),
            handle,
            page: 1,
        });
        self.zoom = self.default_zoom();
        info!(file_id = %file.id, pages = handle.page_count, "Document opened");
        Ok(handle.page_count)
    }

    /// Close the current document, if any.
    pub async fn close(&mut self) {
        if let Some(doc) = self.document.take() {
            self.renderer.close(&doc.handle).await;
            self.cache.invalidate_file(doc.file_id).await;
            debug!(file_id = %doc.file_id, "Document closed");
        }
    }

    /// Id of the open document.
    pub fn file_id(&self) -> Option<FileId> {
        self.document.as_ref().map(|d| d.file_id)
    }

    /// Name of the open document.
    pub fn file_name(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.name.as_str())
    }

    /// Current page, 1-based.
    pub fn page(&self) -> Option<u32> {
        self.document.as_ref().map(|d| d.page)
    }

    /// Number of pages of the open document.
    pub fn page_count(&self) -> Option<u32> {
        self.document.as_ref().map(|d| d.handle.page_count)
    }

    /// Current zoom factor.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    fn document_mut(&mut self) -> AppResult<&mut OpenDocument> {
        self.document
            .as_mut()
            .ok_or_else(|| AppError::not_allowed("No document is open"))
    }

    /// Advance one page, stopping at the last.
    pub fn next_page(&mut self) -> AppResult<u32> {
        let doc = self.document_mut()?;
        doc.page = (doc.page + 1).min(doc.handle.page_count);
        Ok(doc.page)
    }

    /// Go back one page, stopping at the first.
    pub fn previous_page(&mut self) -> AppResult<u32> {
        let doc = self.document_mut()?;
        doc.page = doc.page.saturating_sub(1).max(1);
        Ok(doc.page)
    }

    /// Jump to `page`, clamped to the document.
    pub fn go_to_page(&mut self, page: u32) -> AppResult<u32> {
        let doc = self.document_mut()?;
        doc.page = page.clamp(1, doc.handle.page_count);
        Ok(doc.page)
    }

    fn default_zoom(&self) -> f32 {
        self.clamp_zoom(self.config.default_zoom)
    }

    fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.clamp(self.config.min_zoom, self.config.max_zoom)
    }

    /// Zoom in by one step.
    pub fn zoom_in(&mut self) -> f32 {
        self.zoom = self.clamp_zoom(self.zoom + self.config.zoom_step);
        self.zoom
    }

    /// Zoom out by one step.
    pub fn zoom_out(&mut self) -> f32 {
        self.zoom = self.clamp_zoom(self.zoom - self.config.zoom_step);
        self.zoom
    }

    /// Return to the default zoom.
    pub fn reset_zoom(&mut self) -> f32 {
        self.zoom = self.default_zoom();
        self.zoom
    }

    /// Render the current page at the current zoom, using the page cache.
    pub async fn render_current(&self) -> AppResult<Arc<PageRaster>> {
        let doc = self
            .document
            .as_ref()
            .ok_or_else(|| AppError::not_allowed("No document is open"))?;
        let key = PageKey::new(doc.file_id, doc.page, self.zoom);

        if let Some(raster) = self.cache.get(&key).await {
            debug!(file_id = %doc.file_id, page = doc.page, "Page served from cache");
            return Ok(raster);
        }

        let raster = Arc::new(
            self.renderer
                .render_page(&doc.handle, doc.page, self.zoom)
                .await?,
        );
        self.cache.insert(key, raster.clone()).await;
        Ok(raster)
    }
}

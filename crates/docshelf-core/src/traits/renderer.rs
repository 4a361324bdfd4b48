//! PDF rendering collaborator trait.
//!
//! DocShelf never decodes PDF content itself. A renderer turns raw bytes
//! into an opened document and rasterizes individual pages on demand.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Opaque handle to a document opened by a [`PdfRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentHandle {
    /// Renderer-assigned token identifying the open document.
    pub token: u64,
    /// Number of pages in the document (always at least 1).
    pub page_count: u32,
}

/// An RGBA8 raster of a single rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRaster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA pixels, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl PageRaster {
    /// Returns `true` when the pixel buffer matches the declared dimensions.
    pub fn is_well_formed(&self) -> bool {
        self.pixels.len() as u64 == u64::from(self.width) * u64::from(self.height) * 4
    }
}

/// Trait for PDF rendering engines.
///
/// Page numbers are 1-based. `scale` is a positive multiplier; callers clamp
/// it to the configured zoom range before calling.
#[async_trait]
pub trait PdfRenderer: Send + Sync + std::fmt::Debug + 'static {
    /// Parse `data` as a PDF. Fails with
    /// [`ErrorKind::InvalidPdf`](crate::error::ErrorKind::InvalidPdf) when the
    /// bytes are not a readable document.
    async fn open(&self, data: Bytes) -> AppResult<DocumentHandle>;

    /// Rasterize one page of an opened document.
    async fn render_page(
        &self,
        handle: &DocumentHandle,
        page_number: u32,
        scale: f32,
    ) -> AppResult<PageRaster>;

    /// Release resources held for an opened document.
    async fn close(&self, _handle: &DocumentHandle) {}
}

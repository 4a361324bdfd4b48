//! First-page thumbnail generator for PDF documents.

use std::io::Cursor;
use std::sync::Arc;

use bytes::Bytes;
use image::{DynamicImage, ImageFormat, RgbaImage};

use docshelf_core::config::viewer::ThumbnailConfig;
use docshelf_core::error::{AppError, ErrorKind};
use docshelf_core::result::AppResult;
use docshelf_core::traits::renderer::{PageRaster, PdfRenderer};

/// Renders the first page of a document and downsizes it to a PNG.
#[derive(Debug, Clone)]
pub struct ThumbnailGenerator {
    /// Renderer used to rasterize the first page.
    renderer: Arc<dyn PdfRenderer>,
    /// Size and scale settings.
    config: ThumbnailConfig,
}

impl ThumbnailGenerator {
    /// Create a new thumbnail generator.
    pub fn new(renderer: Arc<dyn PdfRenderer>, config: ThumbnailConfig) -> Self {
        Self { renderer, config }
    }

    /// Whether thumbnails should be generated at all.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Generate a PNG thumbnail for the document in `data`.
    pub async fn generate(&self, data: Bytes) -> AppResult<Bytes> {
        let handle = self.renderer.open(data).await?;
        let rendered = self
            .renderer
            .render_page(&handle, 1, self.config.render_scale)
            .await;
        self.renderer.close(&handle).await;
        let raster = rendered?;

        let max_edge = self.config.max_edge_px;
        let png = tokio::task::spawn_blocking(move || Self::encode_png(raster, max_edge))
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Thumbnail task panicked", e)
            })??;

        tracing::debug!(
            pages = handle.page_count,
            max_edge,
            bytes = png.len(),
            "Generated thumbnail"
        );

        Ok(png)
    }

    /// Shrink a raster to fit `max_edge` and encode it as PNG.
    fn encode_png(raster: PageRaster, max_edge: u32) -> AppResult<Bytes> {
        if raster.width == 0 || raster.height == 0 || !raster.is_well_formed() {
            return Err(AppError::internal(format!(
                "Renderer returned a malformed {}x{} raster",
                raster.width, raster.height
            )));
        }

        let image = RgbaImage::from_raw(raster.width, raster.height, raster.pixels)
            .ok_or_else(|| AppError::internal("Raster buffer does not match its dimensions"))?;
        let thumb = DynamicImage::ImageRgba8(image).thumbnail(max_edge, max_edge);

        let mut buf = Cursor::new(Vec::new());
        thumb
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to encode thumbnail", e))?;

        Ok(Bytes::from(buf.into_inner()))
    }
}

//! Viewer and thumbnail configuration.

use serde::{Deserialize, Serialize};

/// Pagination and zoom behaviour of the document viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Smallest zoom factor.
    #[serde(default = "default_min_zoom")]
    pub min_zoom: f32,
    /// Largest zoom factor.
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f32,
    /// Increment applied by zoom in / zoom out.
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f32,
    /// Zoom factor used when a document is opened.
    #[serde(default = "default_zoom")]
    pub default_zoom: f32,
    /// Number of rendered pages kept in memory.
    #[serde(default = "default_page_cache_capacity")]
    pub page_cache_capacity: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            zoom_step: default_zoom_step(),
            default_zoom: default_zoom(),
            page_cache_capacity: default_page_cache_capacity(),
        }
    }
}

/// Best-effort thumbnail generation at upload time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailConfig {
    /// Whether thumbnails are generated at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Longest edge of the generated thumbnail in pixels.
    #[serde(default = "default_max_edge")]
    pub max_edge_px: u32,
    /// Scale at which the first page is rendered before downsizing.
    #[serde(default = "default_render_scale")]
    pub render_scale: f32,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            max_edge_px: default_max_edge(),
            render_scale: default_render_scale(),
        }
    }
}

fn default_min_zoom() -> f32 {
    0.25
}

fn default_max_zoom() -> f32 {
    3.0
}

fn default_zoom_step() -> f32 {
    0.25
}

fn default_zoom() -> f32 {
    1.0
}

fn default_page_cache_capacity() -> u64 {
    32
}

fn default_true() -> bool {
    true
}

fn default_max_edge() -> u32 {
    200
}

fn default_render_scale() -> f32 {
    0.5
}

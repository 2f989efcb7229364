//! Poster canvas layout.
//!
//! Every region is a fraction of the canvas so the same layout holds at
//! preview and print resolution:
//!
//! ```text
//! +-------------------------------+
//! |  outer margin                 |
//! |  +-------------------------+  |
//! |  | title band              |  |
//! |  +-------------------------+  |
//! |  |                         |  |
//! |  | map (route inset by     |  |
//! |  |  ROUTE_PADDING_PCT)     |  |
//! |  |                         |  |
//! |  +-------------------------+  |
//! |  | metrics band            |  |
//! |  +-------------------------+  |
//! +-------------------------------+
//! ```
//!
//! Margins and the safe zone are fractions of the short side; band heights
//! are fractions of the canvas height.

use poster_common::style::REFERENCE_SHORT_SIDE;
use poster_common::{PosterError, PosterResult, Rect, RenderQuality};
use serde::{Deserialize, Serialize};

/// Margin around all content (fraction of the short side).
pub const OUTER_MARGIN_PCT: f64 = 0.06;
/// Inset that text and markers never cross (fraction of the short side).
pub const SAFE_ZONE_PCT: f64 = 0.10;
/// Title band height (fraction of the canvas height).
pub const TITLE_BAND_PCT: f64 = 0.10;
/// Metrics band height (fraction of the canvas height).
pub const METRICS_BAND_PCT: f64 = 0.15;
/// Route inset inside the map rectangle (fraction of its short side).
pub const ROUTE_PADDING_PCT: f64 = 0.05;

/// Largest accepted side in pixels.
pub const MAX_SIDE: u32 = 16_384;
/// Largest accepted pixel count (~1 GiB of RGBA).
pub const MAX_PIXELS: u64 = 268_435_456;

/// Target canvas for one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasSpec {
    width: u32,
    height: u32,
    quality: RenderQuality,
}

impl CanvasSpec {
    /// Validate and build a canvas. A zero side is a caller error; a canvas
    /// too large to allocate is reported as resource exhaustion.
    pub fn new(width: u32, height: u32, quality: RenderQuality) -> PosterResult<Self> {
        if width == 0 || height == 0 {
            return Err(PosterError::invalid_parameter(
                "canvas",
                format!("size must be non-zero, got {}x{}", width, height),
            ));
        }
        if width > MAX_SIDE || height > MAX_SIDE {
            return Err(PosterError::ResourceExhausted(format!(
                "canvas {}x{} exceeds the {} px side limit",
                width, height, MAX_SIDE
            )));
        }
        if width as u64 * height as u64 > MAX_PIXELS {
            return Err(PosterError::ResourceExhausted(format!(
                "canvas {}x{} exceeds {} pixels",
                width, height, MAX_PIXELS
            )));
        }
        Ok(Self {
            width,
            height,
            quality,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn quality(&self) -> RenderQuality {
        self.quality
    }

    pub fn short_side(&self) -> f64 {
        self.width.min(self.height) as f64
    }

    /// Multiplier from reference-pixel style sizes to canvas pixels.
    pub fn size_scale(&self) -> f64 {
        self.short_side() / REFERENCE_SHORT_SIDE
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f64, self.height as f64)
    }

    /// Canvas minus the outer margin.
    pub fn content_rect(&self) -> Rect {
        let m = self.short_side() * OUTER_MARGIN_PCT;
        self.bounds().inset(m, m)
    }

    /// Region text and markers must stay inside.
    pub fn safe_rect(&self) -> Rect {
        let s = self.short_side() * SAFE_ZONE_PCT;
        self.bounds().inset(s, s)
    }

    pub fn title_band(&self) -> Rect {
        let content = self.content_rect();
        let h = (self.height as f64 * TITLE_BAND_PCT).min(content.height);
        Rect::new(content.x, content.y, content.width, h)
    }

    pub fn metrics_band(&self) -> Rect {
        let content = self.content_rect();
        let h = (self.height as f64 * METRICS_BAND_PCT)
            .min(content.height - self.title_band().height)
            .max(0.0);
        Rect::new(content.x, content.max_y() - h, content.width, h)
    }

    /// Space between the title and metrics bands.
    pub fn map_rect(&self) -> Rect {
        let content = self.content_rect();
        let top = self.title_band().max_y();
        let bottom = self.metrics_band().min_y();
        Rect::new(content.x, top, content.width, (bottom - top).max(0.0))
    }

    /// Map rectangle inset so route strokes never touch its edge.
    pub fn route_rect(&self) -> Rect {
        let map = self.map_rect();
        let pad = map.width.min(map.height) * ROUTE_PADDING_PCT;
        map.inset(pad, pad)
    }

    /// Basemap request size for this canvas's quality tier.
    pub fn basemap_pixel_size(&self) -> (u32, u32) {
        let map = self.map_rect();
        let factor = self.quality.basemap_resolution();
        (
            (map.width * factor).round().max(1.0) as u32,
            (map.height * factor).round().max(1.0) as u32,
        )
    }
}

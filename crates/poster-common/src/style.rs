//! Typed style descriptor for poster rendering.
//!
//! Every recognised option is an explicit field with a default. Unknown keys
//! in a YAML/JSON style file are rejected at load time instead of being
//! silently ignored.
//!
//! Sizes (stroke width, font sizes) are expressed in pixels for a poster
//! whose short side is [`REFERENCE_SHORT_SIDE`] pixels; the renderer scales
//! them with the actual output resolution so a preview and a 300-dpi export
//! look the same.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{PosterError, PosterResult};

/// Short side (in pixels) at which style sizes are taken literally.
pub const REFERENCE_SHORT_SIDE: f64 = 1000.0;

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse "#RRGGBB" or "#RRGGBBAA".
    pub fn from_hex(s: &str) -> PosterResult<Self> {
        let hex = s.trim().trim_start_matches('#');
        let channel = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| PosterError::InvalidStyle(format!("invalid color '{}'", s)))
        };
        match hex.len() {
            6 => Ok(Color::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Ok(Color::rgba(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => Err(PosterError::InvalidStyle(format!(
                "invalid color '{}': expected #RRGGBB or #RRGGBBAA",
                s
            ))),
        }
    }

    pub fn to_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Same color with a different alpha.
    pub fn with_alpha(&self, a: u8) -> Color {
        Color { a, ..*self }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for Color {
    type Err = PosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = PosterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Stroke end-cap style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCap {
    #[default]
    Round,
    Square,
    Butt,
}

/// Complete poster style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PosterStyle {
    /// Canvas fill used when no basemap is available.
    pub background: Color,
    /// Main route stroke color.
    pub route_color: Color,
    /// Thin contrasting stroke drawn inside the main stroke.
    pub route_inner_color: Color,
    /// Draw the inner stroke (useful over busy basemaps).
    pub inner_stroke: bool,
    /// Route stroke width (reference pixels).
    pub stroke_width: f64,
    pub line_cap: LineCap,
    pub show_markers: bool,
    pub start_color: Color,
    pub finish_color: Color,
    /// Draw a direction tick every N simplified points.
    pub direction_tick_stride: Option<usize>,
    /// Title / metrics band panel fill.
    pub panel_color: Color,
    pub text_color: Color,
    pub secondary_text_color: Color,
    pub title_font_size: f64,
    pub metric_font_size: f64,
    pub label_font_size: f64,
    /// TrueType font used for the text bands.
    pub font_path: Option<PathBuf>,
}

impl Default for PosterStyle {
    fn default() -> Self {
        Self {
            background: Color::rgb(0xf5, 0xf1, 0xe8),
            route_color: Color::rgb(0x1f, 0x2a, 0x44),
            route_inner_color: Color::rgba(255, 255, 255, 204),
            inner_stroke: false,
            stroke_width: 4.0,
            line_cap: LineCap::Round,
            show_markers: true,
            start_color: Color::rgb(0x2e, 0x9e, 0x5b),
            finish_color: Color::rgb(0xd6, 0x45, 0x45),
            direction_tick_stride: None,
            panel_color: Color::rgba(255, 255, 255, 217),
            text_color: Color::rgb(0x1a, 0x1a, 0x1a),
            secondary_text_color: Color::rgb(0x6b, 0x6b, 0x6b),
            title_font_size: 56.0,
            metric_font_size: 28.0,
            label_font_size: 14.0,
            font_path: None,
        }
    }
}

impl PosterStyle {
    /// Load a style from a YAML or JSON file (chosen by extension; YAML
    /// otherwise).
    pub fn from_file(path: impl AsRef<Path>) -> PosterResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let style = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content)?,
            _ => Self::from_yaml(&content)?,
        };
        Ok(style)
    }

    pub fn from_yaml(yaml: &str) -> PosterResult<Self> {
        let style: PosterStyle = serde_yaml::from_str(yaml)?;
        style.validate()?;
        Ok(style)
    }

    pub fn from_json(json: &str) -> PosterResult<Self> {
        let style: PosterStyle = serde_json::from_str(json)?;
        style.validate()?;
        Ok(style)
    }

    /// Reject sizes that cannot produce a sensible drawing.
    pub fn validate(&self) -> PosterResult<()> {
        let sizes = [
            ("stroke_width", self.stroke_width),
            ("title_font_size", self.title_font_size),
            ("metric_font_size", self.metric_font_size),
            ("label_font_size", self.label_font_size),
        ];
        for (name, value) in sizes {
            if !value.is_finite() || value <= 0.0 {
                return Err(PosterError::InvalidStyle(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if self.direction_tick_stride == Some(0) {
            return Err(PosterError::InvalidStyle(
                "direction_tick_stride must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Canonical serialized form, used when fingerprinting a render request.
    pub fn canonical_json(&self) -> String {
        // Field order is fixed by the struct definition, so this is stable.
        serde_json::to_string(self).unwrap_or_default()
    }
}

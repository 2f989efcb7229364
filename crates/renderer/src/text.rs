//! Title and metrics text for the poster bands.
//!
//! Text is laid out into positioned runs first and drawn afterwards, so the
//! compositor can draw stroked fallback glyphs on the premultiplied canvas
//! and TrueType text (rusttype via imageproc) on the final straight-alpha
//! image.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use poster_common::{Color, PosterStyle, Rect, Route};
use projection::RouteStats;
use rusttype::{Font, Scale};
use serde::{Deserialize, Serialize};
use tiny_skia::Pixmap;
use tracing::warn;

use crate::glyphs;
use crate::layout::CanvasSpec;
use crate::route::paint_for;

const METERS_PER_MILE: f64 = 1_609.344;
const FEET_PER_METER: f64 = 3.280_84;

/// Widest share of a metrics column a value may occupy before it shrinks.
const COLUMN_FILL: f32 = 0.9;

/// Unit system for formatted metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

/// One labelled value in the metrics band.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

impl Metric {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Text shown on the poster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextBlock {
    pub title: String,
    pub metrics: Vec<Metric>,
}

impl TextBlock {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            metrics: Vec::new(),
        }
    }

    /// Title plus Distance, Elevation, Time and Date. Metrics whose source
    /// data is missing from the route are left out.
    pub fn from_route(title: impl Into<String>, route: &Route, units: Units) -> Self {
        let stats = RouteStats::compute(route);
        let mut metrics = vec![Metric::new("Distance", format_distance(stats.distance_m, units))];

        if let Some(gain) = stats.elevation_gain_m {
            metrics.push(Metric::new("Elevation", format_elevation(gain, units)));
        }
        if let Some(duration) = stats.duration {
            metrics.push(Metric::new("Time", format_duration(duration.num_seconds())));
        }
        if let Some(started) = stats.started_at {
            metrics.push(Metric::new("Date", started.format("%-d %b %Y").to_string()));
        }

        Self {
            title: title.into(),
            metrics,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.metrics.is_empty()
    }
}

/// Insert thousands separators into a non-negative integer.
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_distance(meters: f64, units: Units) -> String {
    match units {
        Units::Metric if meters < 1_000.0 => format!("{} m", group_thousands(meters.round() as u64)),
        Units::Metric if meters < 100_000.0 => format!("{:.1} km", meters / 1_000.0),
        Units::Metric => format!("{} km", group_thousands((meters / 1_000.0).round() as u64)),
        Units::Imperial => {
            let miles = meters / METERS_PER_MILE;
            if miles < 0.1 {
                format!("{} ft", group_thousands((meters * FEET_PER_METER).round() as u64))
            } else if miles < 100.0 {
                format!("{:.1} mi", miles)
            } else {
                format!("{} mi", group_thousands(miles.round() as u64))
            }
        }
    }
}

pub fn format_elevation(meters: f64, units: Units) -> String {
    match units {
        Units::Metric => format!("{} m", group_thousands(meters.max(0.0).round() as u64)),
        Units::Imperial => format!(
            "{} ft",
            group_thousands((meters.max(0.0) * FEET_PER_METER).round() as u64)
        ),
    }
}

/// `h:mm:ss`, or `m:ss` under an hour.
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let (h, m, s) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// Draws text with a TrueType font when one is configured, otherwise with
/// the built-in stroked glyphs.
pub enum TextRenderer {
    TrueType(Font<'static>),
    Stroked,
}

impl TextRenderer {
    /// Load the style's font, falling back to stroked glyphs when the font is
    /// missing or unreadable.
    pub fn from_style(style: &PosterStyle) -> Self {
        let Some(path) = style.font_path.as_ref() else {
            return TextRenderer::Stroked;
        };
        match std::fs::read(path) {
            Ok(bytes) => Self::from_font_bytes(bytes).unwrap_or_else(|| {
                warn!(path = %path.display(), "Font could not be parsed, using stroked glyphs");
                TextRenderer::Stroked
            }),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Font unreadable, using stroked glyphs");
                TextRenderer::Stroked
            }
        }
    }

    pub fn from_font_bytes(bytes: Vec<u8>) -> Option<Self> {
        Font::try_from_vec(bytes).map(TextRenderer::TrueType)
    }

    pub fn is_true_type(&self) -> bool {
        matches!(self, TextRenderer::TrueType(_))
    }

    /// Advance width of `text` at `size` pixels.
    pub fn measure(&self, text: &str, size: f32) -> f32 {
        match self {
            TextRenderer::TrueType(font) => text_size(Scale::uniform(size), font, text).0 as f32,
            TextRenderer::Stroked => glyphs::measure(text, size),
        }
    }

    /// Cap height used to centre runs vertically.
    fn cap_height(&self, size: f32) -> f32 {
        match self {
            TextRenderer::TrueType(font) => font.v_metrics(Scale::uniform(size)).ascent * 0.72,
            TextRenderer::Stroked => glyphs::cap_height(size),
        }
    }

    /// Draw runs onto the premultiplied canvas. TrueType runs are skipped here.
    pub fn draw_on_pixmap(&self, pixmap: &mut Pixmap, runs: &[TextRun]) {
        if let TextRenderer::Stroked = self {
            for run in runs {
                glyphs::draw_text(pixmap, &run.text, run.x, run.baseline, run.size, &paint_for(run.color));
            }
        }
    }

    /// Draw runs onto the final straight-alpha image. Only TrueType runs draw.
    pub fn draw_on_image(&self, image: &mut RgbaImage, runs: &[TextRun]) {
        if let TextRenderer::TrueType(font) = self {
            for run in runs {
                let scale = Scale::uniform(run.size);
                let top = run.baseline - font.v_metrics(scale).ascent;
                draw_text_mut(
                    image,
                    Rgba(run.color.to_array()),
                    run.x.round() as i32,
                    top.round() as i32,
                    scale,
                    font,
                    &run.text,
                );
            }
        }
    }
}

/// A positioned line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    /// Left edge in canvas pixels.
    pub x: f32,
    pub baseline: f32,
    pub size: f32,
    pub color: Color,
}

/// Title and metrics runs plus the panels behind them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLayout {
    pub panels: Vec<Rect>,
    pub runs: Vec<TextRun>,
}

/// Shrink `size` so `text` fits in `max_width`.
fn fitted_size(renderer: &TextRenderer, text: &str, size: f32, max_width: f32) -> f32 {
    let width = renderer.measure(text, size);
    if width > max_width && width > 0.0 {
        size * max_width / width
    } else {
        size
    }
}

fn centered_run(
    renderer: &TextRenderer,
    text: String,
    center_x: f32,
    baseline: f32,
    size: f32,
    color: Color,
) -> TextRun {
    let width = renderer.measure(&text, size);
    TextRun {
        x: center_x - width / 2.0,
        text,
        baseline,
        size,
        color,
    }
}

/// Position the title in the title band and metrics in equal columns across
/// the metrics band. Runs are kept horizontally inside the safe zone.
pub fn layout_text(
    spec: &CanvasSpec,
    style: &PosterStyle,
    block: &TextBlock,
    renderer: &TextRenderer,
) -> TextLayout {
    let mut layout = TextLayout::default();
    let scale = spec.size_scale() as f32;
    let safe = spec.safe_rect();
    let safe_width = safe.width as f32;
    let center_x = safe.center().0 as f32;

    let title = block.title.trim();
    if !title.is_empty() {
        let band = spec.title_band();
        layout.panels.push(band);
        let size = fitted_size(renderer, title, style.title_font_size as f32 * scale, safe_width);
        let baseline = band.center().1 as f32 + renderer.cap_height(size) / 2.0;
        layout
            .runs
            .push(centered_run(renderer, title.to_string(), center_x, baseline, size, style.text_color));
    }

    if !block.metrics.is_empty() {
        let band = spec.metrics_band();
        layout.panels.push(band);

        let columns = block.metrics.len() as f32;
        let column_width = safe_width / columns;
        let value_base = style.metric_font_size as f32 * scale;
        let label_base = style.label_font_size as f32 * scale;

        for (i, metric) in block.metrics.iter().enumerate() {
            let label = metric.label.to_uppercase();
            let max_width = column_width * COLUMN_FILL;
            let value_size = fitted_size(renderer, &metric.value, value_base, max_width);
            let label_size = fitted_size(renderer, &label, label_base, max_width);

            let value_cap = renderer.cap_height(value_size);
            let label_cap = renderer.cap_height(label_size);
            let gap = label_size * 0.6;
            let block_height = value_cap + gap + label_cap;
            let top = band.center().1 as f32 - block_height / 2.0;
            let column_center = safe.x as f32 + column_width * (i as f32 + 0.5);

            layout.runs.push(centered_run(
                renderer,
                metric.value.clone(),
                column_center,
                top + value_cap,
                value_size,
                style.text_color,
            ));
            layout.runs.push(centered_run(
                renderer,
                label,
                column_center,
                top + block_height,
                label_size,
                style.secondary_text_color,
            ));
        }
    }

    layout
}

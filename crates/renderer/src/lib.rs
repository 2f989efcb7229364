//! Poster rendering.
//!
//! - Canvas layout (margins, bands, safe zone) as resolution-independent fractions
//! - Route stroke layer with markers and direction ticks
//! - Title and metrics text (TrueType or stroked fallback glyphs)
//! - Fixed-order compositing into a straight-alpha RGBA image
//! - PNG encode/decode

pub mod compositor;
pub mod glyphs;
pub mod layout;
pub mod png;
pub mod route;
pub mod text;

pub use compositor::{basemap_layer, compose, render_poster};
pub use layout::CanvasSpec;
pub use png::{decode_png, encode_png};
pub use route::{render_route_layer, RenderLayer};
pub use text::{Metric, TextBlock, TextRenderer, Units};

//! Common types shared across the route poster crates.
//!
//! Geographic input ([`GeoPoint`], [`Route`]), planar geometry
//! ([`PlanarPoint`], [`BoundingBox`], [`Transform`], [`Rect`]), the rendered
//! artifact ([`PosterImage`]) and the typed style descriptor all live here so
//! that the projector, simplifier, renderer and cache agree on one vocabulary.

pub mod bbox;
pub mod error;
pub mod geo;
pub mod image;
pub mod point;
pub mod quality;
pub mod style;

pub use bbox::BoundingBox;
pub use error::{PosterError, PosterResult};
pub use geo::{GeoPoint, Route};
pub use image::{PosterImage, BYTES_PER_PIXEL};
pub use point::{PlanarPoint, Rect, Transform};
pub use quality::RenderQuality;
pub use style::{Color, LineCap, PosterStyle};

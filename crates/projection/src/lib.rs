//! Coordinate projection for route posters.
//!
//! Routes are small (city or regional scale), so a local equirectangular
//! approximation is used instead of a true geodesic projection:
//!
//! - [`LocalProjection`]: geographic -> planar and back, anchored on the route
//! - [`GeoRegion`]: the geographic window handed to basemap providers
//! - [`RouteStats`]: distance, elevation and duration for the metrics band

pub mod equirectangular;
pub mod region;
pub mod stats;

pub use equirectangular::{project, LocalProjection};
pub use region::GeoRegion;
pub use stats::{haversine_distance, RouteStats, EARTH_RADIUS_M};

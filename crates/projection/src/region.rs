//! Geographic windows requested from basemap providers.

use poster_common::GeoPoint;
use serde::{Deserialize, Serialize};

/// Smallest span (degrees) on either axis. Keeps single-point and straight
/// routes from asking a basemap provider for a zero-size window.
pub const MIN_SPAN_DEG: f64 = 0.001;

/// A geographic window: centre plus latitude/longitude span in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoRegion {
    pub center: GeoPoint,
    pub lat_span: f64,
    pub lon_span: f64,
}

impl GeoRegion {
    /// Region spanning two corners, with the minimum span enforced.
    pub fn from_corners(a: GeoPoint, b: GeoPoint) -> Self {
        let min_lat = a.latitude.min(b.latitude);
        let max_lat = a.latitude.max(b.latitude);
        let min_lon = a.longitude.min(b.longitude);
        let max_lon = a.longitude.max(b.longitude);
        Self {
            center: GeoPoint::new((min_lat + max_lat) / 2.0, (min_lon + max_lon) / 2.0),
            lat_span: (max_lat - min_lat).max(MIN_SPAN_DEG),
            lon_span: (max_lon - min_lon).max(MIN_SPAN_DEG),
        }
    }

    /// Region around a set of points, grown by `padding` (fraction of the
    /// span) on every side. `None` for an empty slice.
    pub fn around(points: &[GeoPoint], padding: f64) -> Option<Self> {
        let first = points.first()?;
        let (mut min_lat, mut max_lat) = (first.latitude, first.latitude);
        let (mut min_lon, mut max_lon) = (first.longitude, first.longitude);
        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lon = min_lon.min(p.longitude);
            max_lon = max_lon.max(p.longitude);
        }
        let grow = 1.0 + padding.max(0.0) * 2.0;
        Some(Self {
            center: GeoPoint::new((min_lat + max_lat) / 2.0, (min_lon + max_lon) / 2.0),
            lat_span: (max_lat - min_lat).max(MIN_SPAN_DEG) * grow,
            lon_span: (max_lon - min_lon).max(MIN_SPAN_DEG) * grow,
        })
    }

    pub fn south_west(&self) -> GeoPoint {
        GeoPoint::new(
            self.center.latitude - self.lat_span / 2.0,
            self.center.longitude - self.lon_span / 2.0,
        )
    }

    pub fn north_east(&self) -> GeoPoint {
        GeoPoint::new(
            self.center.latitude + self.lat_span / 2.0,
            self.center.longitude + self.lon_span / 2.0,
        )
    }
}

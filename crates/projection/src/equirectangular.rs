//! Local equirectangular projection.
//!
//! Longitude differences are scaled by `cos(mean_latitude)` to correct for
//! meridian convergence, then both axes are offset so the route's south-west
//! corner sits at the origin:
//!
//! ```text
//! x = (lon - min_lon) * cos(mean_lat)
//! y =  lat - min_lat
//! ```
//!
//! The output unit is "degrees of latitude". Absolute scale is meaningless
//! outside the poster pipeline; only relative distances and bearings are
//! preserved (to within the small-region approximation error).

use poster_common::{GeoPoint, PlanarPoint};
use serde::{Deserialize, Serialize};

/// Lower bound for the longitude scale factor. Routes centred on a pole
/// would otherwise make the inverse projection divide by zero.
const MIN_LON_SCALE: f64 = 1e-9;

/// Projection anchored on one route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalProjection {
    /// Latitude of the planar origin (degrees)
    pub min_lat: f64,
    /// Longitude of the planar origin (degrees)
    pub min_lon: f64,
    /// Mean latitude of the route (degrees)
    pub mean_lat: f64,
    /// cos(mean_lat), applied to longitude differences
    pub lon_scale: f64,
}

impl LocalProjection {
    /// Derive the projection parameters from a route. `None` when empty.
    pub fn for_points(points: &[GeoPoint]) -> Option<Self> {
        let first = points.first()?;

        let mut min_lat = first.latitude;
        let mut min_lon = first.longitude;
        let mut lat_sum = 0.0;
        for p in points {
            min_lat = min_lat.min(p.latitude);
            min_lon = min_lon.min(p.longitude);
            lat_sum += p.latitude;
        }
        let mean_lat = lat_sum / points.len() as f64;

        Some(Self {
            min_lat,
            min_lon,
            mean_lat,
            lon_scale: mean_lat.to_radians().cos().max(MIN_LON_SCALE),
        })
    }

    /// Geographic -> planar.
    #[inline]
    pub fn forward(&self, p: &GeoPoint) -> PlanarPoint {
        PlanarPoint {
            x: (p.longitude - self.min_lon) * self.lon_scale,
            y: p.latitude - self.min_lat,
        }
    }

    /// Planar -> geographic.
    #[inline]
    pub fn inverse(&self, p: &PlanarPoint) -> GeoPoint {
        GeoPoint {
            latitude: p.y + self.min_lat,
            longitude: p.x / self.lon_scale + self.min_lon,
        }
    }

    /// Project every point, preserving order.
    pub fn forward_all(&self, points: &[GeoPoint]) -> Vec<PlanarPoint> {
        points.iter().map(|p| self.forward(p)).collect()
    }
}

/// Project a route into local planar space.
///
/// Empty input yields empty output. A route whose points are all identical
/// projects to a single repeated point at the origin.
pub fn project(points: &[GeoPoint]) -> Vec<PlanarPoint> {
    match LocalProjection::for_points(points) {
        Some(projection) => projection.forward_all(points),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(project(&[]).is_empty());
        assert!(LocalProjection::for_points(&[]).is_none());
    }

    #[test]
    fn test_identical_points_collapse_to_origin() {
        let points = vec![GeoPoint::new(48.85, 2.35); 10];
        let planar = project(&points);
        assert_eq!(planar.len(), 10);
        assert!(planar.iter().all(|p| *p == PlanarPoint::new(0.0, 0.0)));
    }

    #[test]
    fn test_longitude_scaled_by_mean_latitude() {
        // At 60°N a degree of longitude is half a degree of latitude.
        let points = [GeoPoint::new(60.0, 10.0), GeoPoint::new(60.0, 12.0)];
        let planar = project(&points);
        assert!((planar[1].x - 1.0).abs() < 1e-9);
        assert_eq!(planar[1].y, 0.0);
    }

    #[test]
    fn test_origin_is_south_west_corner() {
        let points = [
            GeoPoint::new(45.2, 7.4),
            GeoPoint::new(45.0, 7.6),
            GeoPoint::new(45.1, 7.5),
        ];
        let planar = project(&points);
        assert!(planar.iter().all(|p| p.x >= 0.0 && p.y >= 0.0));
        assert_eq!(planar[1].y, 0.0);
        assert_eq!(planar[0].x, 0.0);
    }

    #[test]
    fn test_inverse_round_trip() {
        let points = [GeoPoint::new(-33.9, 18.4), GeoPoint::new(-33.8, 18.5)];
        let projection = LocalProjection::for_points(&points).unwrap();
        for p in &points {
            let back = projection.inverse(&projection.forward(p));
            assert!((back.latitude - p.latitude).abs() < 1e-9);
            assert!((back.longitude - p.longitude).abs() < 1e-9);
        }
    }

    #[test]
    fn test_projection_is_deterministic() {
        let points: Vec<GeoPoint> = (0..100)
            .map(|i| GeoPoint::new(40.0 + i as f64 * 1e-3, -3.7 + (i as f64 * 0.1).sin() * 1e-2))
            .collect();
        assert_eq!(project(&points), project(&points));
    }
}

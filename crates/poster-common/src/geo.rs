//! Geographic input: points and routes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PosterError, PosterResult};

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// An ordered sequence of geographic points with optional parallel
/// elevation and timestamp arrays.
///
/// Immutable once constructed; [`Route::new`] checks that parallel arrays
/// have the same length as the coordinate sequence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Route {
    points: Vec<GeoPoint>,
    elevations: Option<Vec<f64>>,
    timestamps: Option<Vec<DateTime<Utc>>>,
}

impl Route {
    /// Build a route, validating coordinates and parallel array lengths.
    pub fn new(
        points: Vec<GeoPoint>,
        elevations: Option<Vec<f64>>,
        timestamps: Option<Vec<DateTime<Utc>>>,
    ) -> PosterResult<Self> {
        if let Some(idx) = points.iter().position(|p| !p.is_valid()) {
            return Err(PosterError::InvalidRoute(format!(
                "point {} is not a valid WGS84 coordinate: {:?}",
                idx, points[idx]
            )));
        }
        if let Some(elevations) = &elevations {
            if elevations.len() != points.len() {
                return Err(PosterError::InvalidRoute(format!(
                    "{} elevations for {} points",
                    elevations.len(),
                    points.len()
                )));
            }
        }
        if let Some(timestamps) = &timestamps {
            if timestamps.len() != points.len() {
                return Err(PosterError::InvalidRoute(format!(
                    "{} timestamps for {} points",
                    timestamps.len(),
                    points.len()
                )));
            }
        }
        Ok(Self {
            points,
            elevations,
            timestamps,
        })
    }

    /// Route with coordinates only.
    pub fn from_points(points: Vec<GeoPoint>) -> PosterResult<Self> {
        Self::new(points, None, None)
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn elevations(&self) -> Option<&[f64]> {
        self.elevations.as_deref()
    }

    pub fn timestamps(&self) -> Option<&[DateTime<Utc>]> {
        self.timestamps.as_deref()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_rejects_mismatched_elevations() {
        let points = vec![GeoPoint::new(45.0, 7.0), GeoPoint::new(45.1, 7.1)];
        let err = Route::new(points, Some(vec![100.0]), None).unwrap_err();
        assert!(matches!(err, PosterError::InvalidRoute(_)));
    }

    #[test]
    fn test_route_rejects_out_of_range_coordinates() {
        let points = vec![GeoPoint::new(91.0, 7.0)];
        assert!(Route::from_points(points).is_err());
        let points = vec![GeoPoint::new(f64::NAN, 7.0)];
        assert!(Route::from_points(points).is_err());
    }

    #[test]
    fn test_empty_route_is_valid() {
        let route = Route::from_points(Vec::new()).unwrap();
        assert!(route.is_empty());
        assert!(route.elevations().is_none());
    }
}

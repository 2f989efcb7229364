//! Route file input.
//!
//! ```json
//! { "points": [ { "lat": 46.55, "lon": 7.98, "ele": 1200.0, "time": "2024-01-15T12:00:00Z" } ] }
//! ```
//!
//! `ele` and `time` are optional, but must be given for every point or for
//! none of them.

use chrono::{DateTime, Utc};
use poster_common::{GeoPoint, PosterError, PosterResult, Route};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RouteFile {
    points: Vec<RoutePoint>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RoutePoint {
    lat: f64,
    lon: f64,
    #[serde(default)]
    ele: Option<f64>,
    #[serde(default)]
    time: Option<DateTime<Utc>>,
}

/// All-or-nothing collection of an optional per-point field.
fn parallel_array<T>(
    points: &[RoutePoint],
    name: &str,
    field: impl Fn(&RoutePoint) -> Option<T>,
) -> PosterResult<Option<Vec<T>>> {
    let values: Vec<T> = points.iter().filter_map(&field).collect();
    if values.is_empty() {
        return Ok(None);
    }
    if values.len() != points.len() {
        return Err(PosterError::InvalidRoute(format!(
            "'{}' given for {} of {} points",
            name,
            values.len(),
            points.len()
        )));
    }
    Ok(Some(values))
}

/// Parse a route document.
pub fn parse_route_json(json: &str) -> PosterResult<Route> {
    let file: RouteFile = serde_json::from_str(json)?;
    let elevations = parallel_array(&file.points, "ele", |p| p.ele)?;
    let timestamps = parallel_array(&file.points, "time", |p| p.time)?;
    let points = file
        .points
        .iter()
        .map(|p| GeoPoint::new(p.lat, p.lon))
        .collect();
    Route::new(points, elevations, timestamps)
}

/// Read and parse a route file.
pub async fn read_route_file(path: impl AsRef<Path>) -> PosterResult<Route> {
    let path = path.as_ref();
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| PosterError::Io(format!("cannot read {}: {}", path.display(), e)))?;
    parse_route_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::fixtures::documents::ROUTE_JSON;

    #[test]
    fn test_parse_fixture() {
        let route = parse_route_json(ROUTE_JSON).unwrap();
        assert_eq!(route.len(), 4);
        assert_eq!(route.points()[0], GeoPoint::new(46.55, 7.98));
        assert_eq!(route.elevations().map(|e| e.len()), Some(4));
        assert_eq!(route.timestamps().map(|t| t.len()), Some(4));
    }

    #[test]
    fn test_optional_fields_absent() {
        let route = parse_route_json(r#"{"points":[{"lat":1.0,"lon":2.0},{"lat":1.5,"lon":2.5}]}"#).unwrap();
        assert!(route.elevations().is_none());
        assert!(route.timestamps().is_none());
    }

    #[test]
    fn test_partial_elevation_rejected() {
        let err = parse_route_json(r#"{"points":[{"lat":1.0,"lon":2.0,"ele":5.0},{"lat":1.5,"lon":2.5}]}"#)
            .unwrap_err();
        assert!(matches!(err, PosterError::InvalidRoute(_)));
    }

    #[test]
    fn test_out_of_range_coordinate_rejected() {
        let err = parse_route_json(r#"{"points":[{"lat":91.0,"lon":0.0}]}"#).unwrap_err();
        assert!(matches!(err, PosterError::InvalidRoute(_)));
    }

    #[test]
    fn test_empty_route_is_valid() {
        let route = parse_route_json(r#"{"points":[]}"#).unwrap();
        assert!(route.is_empty());
    }
}

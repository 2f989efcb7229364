//! Route statistics shown in the poster's metrics band.

use chrono::{DateTime, Duration, Utc};
use poster_common::{GeoPoint, Route};
use serde::{Deserialize, Serialize};

/// Mean Earth radius in metres (IUGG).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Great-circle distance between two points in metres.
pub fn haversine_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Summary numbers for one route.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteStats {
    pub point_count: usize,
    pub distance_m: f64,
    /// Sum of positive elevation deltas; `None` without elevation data.
    pub elevation_gain_m: Option<f64>,
    /// Sum of negative elevation deltas as a positive number.
    pub elevation_loss_m: Option<f64>,
    /// Last timestamp minus first; `None` without timestamps.
    pub duration: Option<Duration>,
    pub started_at: Option<DateTime<Utc>>,
}

impl RouteStats {
    pub fn compute(route: &Route) -> Self {
        let points = route.points();

        let distance_m = points
            .windows(2)
            .map(|w| haversine_distance(&w[0], &w[1]))
            .sum();

        let (elevation_gain_m, elevation_loss_m) = match route.elevations() {
            Some(elevations) => {
                let mut gain = 0.0;
                let mut loss = 0.0;
                for w in elevations.windows(2) {
                    let delta = w[1] - w[0];
                    if !delta.is_finite() {
                        continue;
                    }
                    if delta > 0.0 {
                        gain += delta;
                    } else {
                        loss -= delta;
                    }
                }
                (Some(gain), Some(loss))
            }
            None => (None, None),
        };

        let (duration, started_at) = match route.timestamps() {
            Some([first, .., last]) => (Some(*last - *first), Some(*first)),
            Some([only]) => (Some(Duration::zero()), Some(*only)),
            _ => (None, None),
        };

        Self {
            point_count: points.len(),
            distance_m,
            elevation_gain_m,
            elevation_loss_m,
            duration,
            started_at,
        }
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_m / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_haversine_one_degree_of_latitude() {
        let d = haversine_distance(&GeoPoint::new(0.0, 0.0), &GeoPoint::new(1.0, 0.0));
        // 1° of arc on a 6371 km sphere
        assert!((d - 111_195.0).abs() < 10.0, "got {}", d);
        assert_eq!(
            haversine_distance(&GeoPoint::new(10.0, 10.0), &GeoPoint::new(10.0, 10.0)),
            0.0
        );
    }

    #[test]
    fn test_empty_route_stats() {
        let stats = RouteStats::compute(&Route::default());
        assert_eq!(stats.point_count, 0);
        assert_eq!(stats.distance_m, 0.0);
        assert!(stats.elevation_gain_m.is_none());
        assert!(stats.duration.is_none());
    }

    #[test]
    fn test_elevation_gain_and_loss() {
        let points = vec![GeoPoint::new(46.0, 8.0); 5];
        let route = Route::new(points, Some(vec![100.0, 150.0, 120.0, 180.0, 170.0]), None).unwrap();
        let stats = RouteStats::compute(&route);
        assert_eq!(stats.elevation_gain_m, Some(110.0));
        assert_eq!(stats.elevation_loss_m, Some(40.0));
    }

    #[test]
    fn test_duration_from_timestamps() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 7, 30, 0).unwrap();
        let times = vec![start, start + Duration::minutes(20), start + Duration::minutes(95)];
        let points = vec![
            GeoPoint::new(46.0, 8.0),
            GeoPoint::new(46.01, 8.0),
            GeoPoint::new(46.02, 8.0),
        ];
        let stats = RouteStats::compute(&Route::new(points, None, Some(times)).unwrap());
        assert_eq!(stats.duration, Some(Duration::minutes(95)));
        assert_eq!(stats.started_at, Some(start));
        assert!((stats.distance_km() - 2.224).abs() < 0.01);
    }
}

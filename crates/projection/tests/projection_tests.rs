//! Integration tests for local projection, regions and statistics.

use poster_common::{BoundingBox, GeoPoint, Route};
use projection::{haversine_distance, project, GeoRegion, LocalProjection, RouteStats};
use test_utils::{assert_approx_eq, geo_loop, places, sample_route};

// ============================================================================
// Projection
// ============================================================================

#[test]
fn test_loop_projects_to_circle() {
    // A geographic circle stays round after longitude correction.
    let points = geo_loop(361, places::PARIS, 0.01);
    let planar = project(&points);
    let bbox = BoundingBox::from_points(&planar).unwrap();
    assert_approx_eq!(bbox.width() / bbox.height(), 1.0, 0.01);
}

#[test]
fn test_high_latitude_loop_stays_round() {
    let points = geo_loop(361, places::TROMSO, 0.02);
    let bbox = BoundingBox::from_points(&project(&points)).unwrap();
    assert_approx_eq!(bbox.width() / bbox.height(), 1.0, 0.02);
}

#[test]
fn test_planar_distance_tracks_haversine() {
    let points = geo_loop(100, places::CAPE_TOWN, 0.05);
    let planar = project(&points);
    // One planar unit is one degree of latitude.
    let metres_per_unit = haversine_distance(&GeoPoint::new(0.0, 0.0), &GeoPoint::new(1.0, 0.0));
    for i in 1..points.len() {
        let geo = haversine_distance(&points[i - 1], &points[i]);
        let flat = planar[i - 1].distance_to(&planar[i]) * metres_per_unit;
        assert!((geo - flat).abs() / geo.max(1.0) < 0.01);
    }
}

#[test]
fn test_projection_is_bit_identical_across_calls() {
    let route = sample_route(2_000);
    let a = project(route.points());
    let b = project(route.points());
    assert_eq!(a, b);
}

// ============================================================================
// Regions
// ============================================================================

#[test]
fn test_region_from_inverse_projected_corners() {
    let points = geo_loop(50, places::PARIS, 0.05);
    let projection = LocalProjection::for_points(&points).unwrap();
    let bbox = BoundingBox::from_points(&projection.forward_all(&points)).unwrap();

    let sw = projection.inverse(&poster_common::PlanarPoint::new(bbox.min_x, bbox.min_y));
    let ne = projection.inverse(&poster_common::PlanarPoint::new(bbox.max_x, bbox.max_y));
    let region = GeoRegion::from_corners(sw, ne);

    assert_approx_eq!(region.center.latitude, places::PARIS.latitude, 1e-3);
    assert_approx_eq!(region.center.longitude, places::PARIS.longitude, 1e-3);
    assert_approx_eq!(region.lat_span, 0.1, 1e-3);
}

// ============================================================================
// Statistics
// ============================================================================

#[test]
fn test_stats_for_generated_route() {
    let route = sample_route(600);
    let stats = RouteStats::compute(&route);
    assert_eq!(stats.point_count, 600);
    assert!(stats.distance_m > 0.0);
    assert_eq!(stats.duration.map(|d| d.num_seconds()), Some(599));
    assert!(stats.elevation_gain_m.unwrap() > 0.0);
}

#[test]
fn test_single_point_route_stats() {
    let route = Route::from_points(vec![places::ORIGIN]).unwrap();
    let stats = RouteStats::compute(&route);
    assert_eq!(stats.point_count, 1);
    assert_eq!(stats.distance_m, 0.0);
}

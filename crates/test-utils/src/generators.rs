//! Synthetic route generators.
//!
//! These generators create predictable, verifiable polylines that can be
//! used across the test suite and in benchmarks. All of them are
//! deterministic: the same arguments always produce the same points.

use chrono::{DateTime, Duration, TimeZone, Utc};
use poster_common::{GeoPoint, PlanarPoint, Route};

/// `n` evenly spaced colinear points from `from` to `to` (inclusive).
///
/// # Example
///
/// ```
/// use test_utils::straight_line;
///
/// let line = straight_line(100, (0.0, 0.0), (10.0, 0.0));
/// assert_eq!(line.len(), 100);
/// assert_eq!(line[99].x, 10.0);
/// ```
pub fn straight_line(n: usize, from: (f64, f64), to: (f64, f64)) -> Vec<PlanarPoint> {
    if n == 1 {
        return vec![PlanarPoint::new(from.0, from.1)];
    }
    (0..n)
        .map(|i| {
            let t = i as f64 / (n - 1) as f64;
            if i == n - 1 {
                PlanarPoint::new(to.0, to.1)
            } else {
                PlanarPoint::new(from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t)
            }
        })
        .collect()
}

/// `n` points along `periods` full sine periods over x in `[0, length]`.
pub fn sine_wave(n: usize, length: f64, amplitude: f64, periods: f64) -> Vec<PlanarPoint> {
    let denom = n.saturating_sub(1).max(1) as f64;
    (0..n)
        .map(|i| {
            let t = i as f64 / denom;
            let x = t * length;
            let y = amplitude * (t * periods * std::f64::consts::TAU).sin();
            PlanarPoint::new(x, y)
        })
        .collect()
}

/// `n` points on a triangle wave with one corner every `tooth` points,
/// swinging between `-amplitude` and `+amplitude`, one unit apart on x.
/// Every point gets a deterministic vertical offset in `[-jitter, jitter]`,
/// so a tolerance above `2 * jitter` keeps only the corners and endpoints.
pub fn noisy_zigzag(n: usize, tooth: usize, amplitude: f64, jitter: f64) -> Vec<PlanarPoint> {
    let tooth = tooth.max(1);
    (0..n)
        .map(|i| {
            let phase = i % (2 * tooth);
            let t = (phase % tooth) as f64 / tooth as f64;
            let base = if phase < tooth {
                -amplitude + 2.0 * amplitude * t
            } else {
                amplitude - 2.0 * amplitude * t
            };
            let hash = (i as u64).wrapping_add(1).wrapping_mul(6_364_136_223_846_793_005) >> 40;
            let noise = hash as f64 / (1u64 << 24) as f64 * 2.0 - 1.0;
            PlanarPoint::new(i as f64, base + jitter * noise)
        })
        .collect()
}

/// A closed loop of `n` geographic points around `center`, `radius_deg`
/// degrees of latitude in radius. The last point repeats the first.
pub fn geo_loop(n: usize, center: GeoPoint, radius_deg: f64) -> Vec<GeoPoint> {
    let lon_scale = center.latitude.to_radians().cos().max(1e-6);
    let denom = n.saturating_sub(1).max(1) as f64;
    (0..n)
        .map(|i| {
            let theta = if i + 1 == n {
                0.0
            } else {
                i as f64 / denom * std::f64::consts::TAU
            };
            GeoPoint::new(
                center.latitude + radius_deg * theta.sin(),
                center.longitude + radius_deg * theta.cos() / lon_scale,
            )
        })
        .collect()
}

/// GPS-like random walk of `n` points starting at `start`, with jitter
/// driven by a deterministic hash of `seed`.
pub fn gps_track(n: usize, start: GeoPoint, seed: u32) -> Vec<GeoPoint> {
    let mut heading: f64 = 0.0;
    let mut current = start;
    let mut points = Vec::with_capacity(n);
    for i in 0..n {
        points.push(current);
        let h = simple_hash(i as u32, 0, seed);
        // Turn by up to ±0.3 rad, step ~10 m.
        heading += ((h % 1000) as f64 / 1000.0 - 0.5) * 0.6;
        let step = 1e-4;
        current = GeoPoint::new(
            (current.latitude + step * heading.sin()).clamp(-89.0, 89.0),
            current.longitude + step * heading.cos(),
        );
    }
    points
}

/// A route with elevation and one-second timestamps for every point.
pub fn sample_route(n: usize) -> Route {
    let points = gps_track(n, GeoPoint::new(46.55, 7.98), 7);
    let elevations = (0..n)
        .map(|i| 1200.0 + 80.0 * (i as f64 * 0.05).sin())
        .collect();
    let timestamps = (0..n)
        .map(|i| reference_time() + Duration::seconds(i as i64))
        .collect();
    // Generated coordinates are always in range.
    Route::new(points, Some(elevations), Some(timestamps))
        .unwrap_or_else(|e| panic!("generated route is invalid: {}", e))
}

/// Fixed reference time for tests (2024-01-15T12:00:00Z).
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

/// Creates RGBA pixel data for a simple gradient test pattern.
///
/// Useful as a stand-in basemap raster.
pub fn create_test_rgba_pixels(width: usize, height: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            let r = ((x as f32 / width as f32) * 255.0) as u8;
            let g = ((y as f32 / height as f32) * 255.0) as u8;
            let b = 128u8;
            let a = 255u8;
            pixels.extend_from_slice(&[r, g, b, a]);
        }
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_line_endpoints() {
        let line = straight_line(100, (0.0, 0.0), (10.0, 0.0));
        assert_eq!(line.len(), 100);
        assert_eq!(line[0], PlanarPoint::new(0.0, 0.0));
        assert_eq!(line[99], PlanarPoint::new(10.0, 0.0));
        assert!(line.iter().all(|p| p.y == 0.0));
    }

    #[test]
    fn test_sine_wave_bounds() {
        let wave = sine_wave(500, 100.0, 5.0, 3.0);
        assert_eq!(wave.len(), 500);
        assert!(wave.iter().all(|p| p.y.abs() <= 5.0 + 1e-9));
        assert_eq!(wave[499].x, 100.0);
    }

    #[test]
    fn test_noisy_zigzag_corners() {
        let z = noisy_zigzag(101, 10, 4.0, 0.1);
        assert_eq!(z.len(), 101);
        assert!(z.iter().all(|p| p.y.abs() <= 4.1 + 1e-9));
        assert!((z[0].y + 4.0).abs() <= 0.1 + 1e-9);
        assert!((z[10].y - 4.0).abs() <= 0.1 + 1e-9);
        assert!((z[20].y + 4.0).abs() <= 0.1 + 1e-9);
        assert_eq!(z, noisy_zigzag(101, 10, 4.0, 0.1));
    }

    #[test]
    fn test_geo_loop_is_closed() {
        let pts = geo_loop(64, GeoPoint::new(45.0, 7.0), 0.01);
        assert_eq!(pts.len(), 64);
        assert_eq!(pts[0], pts[63]);
        assert!(pts.iter().all(|p| p.is_valid()));
    }

    #[test]
    fn test_gps_track_deterministic() {
        let a = gps_track(200, GeoPoint::new(0.0, 0.0), 42);
        let b = gps_track(200, GeoPoint::new(0.0, 0.0), 42);
        let c = gps_track(200, GeoPoint::new(0.0, 0.0), 43);
        assert_eq!(a, b, "Same seed should produce same track");
        assert_ne!(a, c, "Different seed should produce different track");
    }

    #[test]
    fn test_sample_route_has_parallel_arrays() {
        let route = sample_route(50);
        assert_eq!(route.len(), 50);
        assert_eq!(route.elevations().map(|e| e.len()), Some(50));
        assert_eq!(route.timestamps().map(|t| t.len()), Some(50));
    }

    #[test]
    fn test_create_test_rgba_pixels() {
        let pixels = create_test_rgba_pixels(16, 16);
        assert_eq!(pixels.len(), 16 * 16 * 4);
        assert_eq!(&pixels[0..4], &[0, 0, 128, 255]);
    }
}

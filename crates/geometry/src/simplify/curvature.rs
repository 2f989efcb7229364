//! Curvature-weighted sampling and route complexity scoring.

use poster_common::{PlanarPoint, PosterResult};
use serde::{Deserialize, Serialize};

use super::budget::check_max_points;

/// Average turning angle (radians) above which a route counts as detailed.
pub const HIGH_DETAIL_AVERAGE: f64 = 0.5;
/// Maximum turning angle (radians) above which a route counts as detailed.
pub const HIGH_DETAIL_MAX: f64 = 1.0;

/// Absolute turning angle at `b` between segments `a`-`b` and `b`-`c`, in
/// `[0, π]`. Zero-length segments score zero.
#[inline]
pub fn turning_angle(a: &PlanarPoint, b: &PlanarPoint, c: &PlanarPoint) -> f64 {
    let (ux, uy) = (b.x - a.x, b.y - a.y);
    let (vx, vy) = (c.x - b.x, c.y - b.y);
    let cross = ux * vy - uy * vx;
    let dot = ux * vx + uy * vy;
    cross.atan2(dot).abs()
}

/// Turning angle of every interior point; `scores[k]` belongs to point `k + 1`.
pub fn turning_angles(points: &[PlanarPoint]) -> Vec<f64> {
    points
        .windows(3)
        .map(|w| turning_angle(&w[0], &w[1], &w[2]))
        .collect()
}

/// Keep the `max_points - 2` interior points with the sharpest turns plus
/// both endpoints, in original order. Ties go to the earlier point.
pub fn curvature_sample(points: &[PlanarPoint], max_points: usize) -> PosterResult<Vec<PlanarPoint>> {
    check_max_points(max_points)?;

    let n = points.len();
    if n <= max_points {
        return Ok(points.to_vec());
    }

    let scores = turning_angles(points);
    let mut ranked: Vec<usize> = (1..n - 1).collect();
    ranked.sort_by(|&i, &j| scores[j - 1].total_cmp(&scores[i - 1]).then(i.cmp(&j)));
    ranked.truncate(max_points - 2);
    ranked.sort_unstable();

    let mut out = Vec::with_capacity(max_points);
    out.push(points[0]);
    out.extend(ranked.into_iter().map(|i| points[i]));
    out.push(points[n - 1]);
    Ok(out)
}

/// Turning-angle statistics for a whole route.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Complexity {
    pub average: f64,
    pub max: f64,
}

impl Complexity {
    pub fn of(points: &[PlanarPoint]) -> Self {
        let scores = turning_angles(points);
        if scores.is_empty() {
            return Self::default();
        }
        let sum: f64 = scores.iter().sum();
        let max = scores.iter().copied().fold(0.0, f64::max);
        Self {
            average: sum / scores.len() as f64,
            max,
        }
    }

    pub fn is_high_detail(&self) -> bool {
        self.average > HIGH_DETAIL_AVERAGE || self.max > HIGH_DETAIL_MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<PlanarPoint> {
        coords.iter().map(|&c| c.into()).collect()
    }

    #[test]
    fn test_turning_angle_values() {
        let a = PlanarPoint::new(0.0, 0.0);
        let b = PlanarPoint::new(1.0, 0.0);
        assert_eq!(turning_angle(&a, &b, &PlanarPoint::new(2.0, 0.0)), 0.0);
        let right = turning_angle(&a, &b, &PlanarPoint::new(1.0, 1.0));
        assert!((right - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        let reverse = turning_angle(&a, &b, &PlanarPoint::new(0.0, 0.0));
        assert!((reverse - std::f64::consts::PI).abs() < 1e-12);
        // Duplicate point: zero-length segment
        assert_eq!(turning_angle(&a, &a, &b), 0.0);
    }

    #[test]
    fn test_keeps_sharpest_corners() {
        // Straight run with two corners at indices 3 and 6.
        let line = pts(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (3.0, 0.0),
            (3.0, 1.0),
            (3.0, 2.0),
            (3.0, 3.0),
            (4.0, 3.0),
            (5.0, 3.0),
        ]);
        let out = curvature_sample(&line, 4).unwrap();
        assert_eq!(out, pts(&[(0.0, 0.0), (3.0, 0.0), (3.0, 3.0), (5.0, 3.0)]));
    }

    #[test]
    fn test_ties_prefer_earlier_points() {
        let flat: Vec<PlanarPoint> = (0..10).map(|i| PlanarPoint::new(i as f64, 0.0)).collect();
        let out = curvature_sample(&flat, 4).unwrap();
        assert_eq!(out.iter().map(|p| p.x).collect::<Vec<_>>(), vec![0.0, 1.0, 2.0, 9.0]);
    }

    #[test]
    fn test_budget_of_two_keeps_endpoints_only() {
        let line = pts(&[(0.0, 0.0), (1.0, 5.0), (2.0, 0.0)]);
        assert_eq!(curvature_sample(&line, 2).unwrap(), pts(&[(0.0, 0.0), (2.0, 0.0)]));
        assert!(curvature_sample(&line, 1).is_err());
    }

    #[test]
    fn test_complexity_classification() {
        let straight: Vec<PlanarPoint> = (0..50).map(|i| PlanarPoint::new(i as f64, 0.0)).collect();
        assert!(!Complexity::of(&straight).is_high_detail());

        let zig: Vec<PlanarPoint> = (0..50)
            .map(|i| PlanarPoint::new(i as f64, if i % 2 == 0 { 1.0 } else { -1.0 }))
            .collect();
        let c = Complexity::of(&zig);
        assert!(c.is_high_detail());
        assert!(c.max > HIGH_DETAIL_MAX);

        assert_eq!(Complexity::of(&straight[..2]), Complexity::default());
    }
}

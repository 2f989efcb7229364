//! Strategy selection by route complexity.

use poster_common::{BoundingBox, PlanarPoint, PosterResult};

use super::budget::{budget, check_max_points};
use super::curvature::{curvature_sample, Complexity};
use super::parallel::{parallel_rdp_with, ParallelConfig};

/// Tolerance used for detailed routes, as a fraction of the bbox diagonal
/// before the density correction.
const BASE_TOLERANCE_FRACTION: f64 = 0.001;

/// Tolerance for detailed routes: grows as the requested reduction
/// (`target / n`) gets more aggressive, capped at 10x the base.
pub fn adaptive_epsilon(points: &[PlanarPoint], target_points: usize) -> f64 {
    let diagonal = BoundingBox::from_points(points)
        .map(|b| b.diagonal())
        .unwrap_or(0.0);
    let ratio = target_points as f64 / points.len().max(1) as f64;
    diagonal * BASE_TOLERANCE_FRACTION / ratio.max(0.1)
}

/// Reduce `points` to at most `target_points`.
///
/// Detailed routes (sharp or frequent turns) go through parallel
/// Douglas–Peucker with [`adaptive_epsilon`] and are then budgeted if still
/// too large. Smooth routes use the cheaper curvature sampler.
pub fn adaptive(
    points: &[PlanarPoint],
    target_points: usize,
    parallel: &ParallelConfig,
) -> PosterResult<Vec<PlanarPoint>> {
    check_max_points(target_points)?;
    if points.len() <= target_points {
        return Ok(points.to_vec());
    }

    if Complexity::of(points).is_high_detail() {
        let epsilon = adaptive_epsilon(points, target_points);
        let reduced = parallel_rdp_with(points, epsilon, parallel);
        if reduced.len() > target_points {
            return budget(&reduced, target_points);
        }
        Ok(reduced)
    } else {
        curvature_sample(points, target_points)
    }
}

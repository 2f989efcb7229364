//! Polyline simplification.
//!
//! Four strategies plus an adaptive selector:
//!
//! | Strategy | Output size | Shape error |
//! |---|---|---|
//! | [`rdp`] | data dependent | bounded by `epsilon` |
//! | [`budget`] | exactly `max_points` | unbounded, index-uniform |
//! | [`curvature_sample`] | exactly `max_points` | concentrates on turns |
//! | [`parallel_rdp`] | data dependent | bounded by a small multiple of `epsilon` |
//!
//! Every strategy keeps the first and last input point and returns inputs of
//! two points or fewer unchanged.

pub mod adaptive;
pub mod budget;
pub mod curvature;
pub mod parallel;
pub mod rdp;

use std::time::Instant;

use poster_common::{PlanarPoint, PosterError, PosterResult, RenderQuality};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use adaptive::{adaptive, adaptive_epsilon};
pub use budget::budget;
pub use curvature::{curvature_sample, turning_angle, turning_angles, Complexity};
pub use parallel::{parallel_rdp, parallel_rdp_with, ParallelConfig};
pub use rdp::{rdp, rdp_indices, segment_distance};

/// Selectable simplification strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Strategy {
    Exact { epsilon: f64 },
    Budget { max_points: usize },
    Curvature { max_points: usize },
    Parallel { epsilon: f64 },
    Adaptive { target_points: usize },
}

fn check_epsilon(epsilon: f64) -> PosterResult<()> {
    if !epsilon.is_finite() || epsilon < 0.0 {
        return Err(PosterError::invalid_parameter(
            "epsilon",
            format!("must be finite and non-negative, got {}", epsilon),
        ));
    }
    Ok(())
}

/// Run one strategy.
pub fn simplify(points: &[PlanarPoint], strategy: Strategy) -> PosterResult<Vec<PlanarPoint>> {
    simplify_with(points, strategy, &ParallelConfig::default())
}

/// Run one strategy with explicit parallel chunking.
pub fn simplify_with(
    points: &[PlanarPoint],
    strategy: Strategy,
    parallel: &ParallelConfig,
) -> PosterResult<Vec<PlanarPoint>> {
    match strategy {
        Strategy::Exact { epsilon } => {
            check_epsilon(epsilon)?;
            Ok(rdp(points, epsilon))
        }
        Strategy::Parallel { epsilon } => {
            check_epsilon(epsilon)?;
            Ok(parallel_rdp_with(points, epsilon, parallel))
        }
        Strategy::Budget { max_points } => budget(points, max_points),
        Strategy::Curvature { max_points } => curvature_sample(points, max_points),
        Strategy::Adaptive { target_points } => adaptive(points, target_points, parallel),
    }
}

/// Tolerance and budget for one render, derived from the quality tier and
/// the size of the route on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimplifyParams {
    /// Tolerance in planar units.
    pub epsilon: f64,
    pub max_points: usize,
}

impl SimplifyParams {
    /// `pixels_per_unit` is the fit transform's scale: the tier's pixel
    /// tolerance is converted back into planar units so the same route looks
    /// the same at preview and export resolution.
    pub fn for_canvas(quality: RenderQuality, pixels_per_unit: f64) -> Self {
        let epsilon = if pixels_per_unit.is_finite() && pixels_per_unit > 0.0 {
            quality.tolerance_px() / pixels_per_unit
        } else {
            0.0
        };
        Self {
            epsilon,
            max_points: quality.point_budget(),
        }
    }
}

/// Simplify for drawing: a tolerance pass (parallel for large inputs), then
/// the adaptive selector if the result still exceeds the point budget.
pub fn simplify_for_canvas(
    points: &[PlanarPoint],
    params: &SimplifyParams,
    parallel: &ParallelConfig,
) -> PosterResult<Vec<PlanarPoint>> {
    check_epsilon(params.epsilon)?;
    let started = Instant::now();

    let reduced = parallel_rdp_with(points, params.epsilon, parallel);
    let out = if reduced.len() > params.max_points {
        adaptive(&reduced, params.max_points, parallel)?
    } else {
        reduced
    };

    debug!(
        input_points = points.len(),
        output_points = out.len(),
        epsilon = params.epsilon,
        max_points = params.max_points,
        duration_ms = started.elapsed().as_secs_f64() * 1000.0,
        "Simplified route"
    );
    Ok(out)
}

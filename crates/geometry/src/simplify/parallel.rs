//! Chunked Douglas–Peucker on the rayon pool.
//!
//! The input is cut at evenly spaced split indices. Each chunk runs the
//! exact algorithm over its own range widened by `overlap` points on both
//! sides, so the tolerance test near a split sees the same neighbourhood a
//! single pass would. When stitching, a chunk contributes only the kept
//! points inside the range it owns (split to split); every split index is
//! kept, so adjacent chunks meet at a shared vertex and no point appears
//! twice.

use poster_common::PlanarPoint;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rdp::{rdp, rdp_mask};

/// Chunking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Inputs at or below this size run single-threaded.
    pub threshold: usize,
    /// Lower bound on points per chunk.
    pub min_chunk_size: usize,
    /// Extra points given to each chunk on both sides of its range.
    pub overlap: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            threshold: 1_000,
            min_chunk_size: 500,
            overlap: 50,
        }
    }
}

impl ParallelConfig {
    /// Chunk length for `n` points given `threads` workers.
    pub fn chunk_size(&self, n: usize, threads: usize) -> usize {
        self.min_chunk_size.max(n / threads.max(1)).max(1)
    }
}

/// Parallel Douglas–Peucker with default chunking.
pub fn parallel_rdp(points: &[PlanarPoint], epsilon: f64) -> Vec<PlanarPoint> {
    parallel_rdp_with(points, epsilon, &ParallelConfig::default())
}

/// Parallel Douglas–Peucker with explicit chunking.
pub fn parallel_rdp_with(
    points: &[PlanarPoint],
    epsilon: f64,
    config: &ParallelConfig,
) -> Vec<PlanarPoint> {
    let n = points.len();
    if n <= config.threshold.max(2) {
        return rdp(points, epsilon);
    }

    let chunk = config.chunk_size(n, rayon::current_num_threads());
    let mut splits: Vec<usize> = (0..n - 1).step_by(chunk).collect();
    splits.push(n - 1);
    if splits.len() <= 2 {
        return rdp(points, epsilon);
    }

    let owned: Vec<(usize, usize)> = splits.windows(2).map(|w| (w[0], w[1])).collect();

    let parts: Vec<Vec<usize>> = owned
        .par_iter()
        .map(|&(own_start, own_end)| {
            let start = own_start.saturating_sub(config.overlap);
            let end = (own_end + config.overlap).min(n - 1);
            let mask = rdp_mask(&points[start..=end], epsilon);

            let mut kept = Vec::new();
            kept.push(own_start);
            for i in own_start + 1..own_end {
                if mask[i - start] {
                    kept.push(i);
                }
            }
            kept
        })
        .collect();

    let mut out: Vec<PlanarPoint> = parts
        .into_iter()
        .flatten()
        .map(|i| points[i])
        .collect();
    out.push(points[n - 1]);

    debug!(
        input_points = n,
        output_points = out.len(),
        chunks = owned.len(),
        chunk_size = chunk,
        "Parallel simplification complete"
    );
    out
}

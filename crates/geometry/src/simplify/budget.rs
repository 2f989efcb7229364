//! Fixed-budget downsampling by even index stride.

use poster_common::{PlanarPoint, PosterError, PosterResult};

pub(crate) fn check_max_points(max_points: usize) -> PosterResult<()> {
    if max_points < 2 {
        return Err(PosterError::invalid_parameter(
            "max_points",
            format!("must be at least 2 to keep both endpoints, got {}", max_points),
        ));
    }
    Ok(())
}

/// Downsample to exactly `max_points` points when the input is larger,
/// picking interior points at an even stride over the index range. Both
/// endpoints are always kept. Inputs already within budget come back as-is.
///
/// Sampling is by index, not arc length: dense clusters (GPS points at a
/// stop) get proportionally more of the budget.
pub fn budget(points: &[PlanarPoint], max_points: usize) -> PosterResult<Vec<PlanarPoint>> {
    check_max_points(max_points)?;

    let n = points.len();
    if n <= max_points {
        return Ok(points.to_vec());
    }

    let interior_in = n - 2;
    let interior_out = max_points - 2;
    let mut out = Vec::with_capacity(max_points);
    out.push(points[0]);
    // Strictly increasing because interior_in > interior_out.
    for i in 0..interior_out {
        out.push(points[1 + i * interior_in / interior_out]);
    }
    out.push(points[n - 1]);
    Ok(out)
}

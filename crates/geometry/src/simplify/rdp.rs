//! Douglas–Peucker simplification.
//!
//! Iterative form with an explicit work stack, so pathological single-chunk
//! inputs (hundreds of thousands of near-colinear points) cannot overflow the
//! call stack.

use poster_common::PlanarPoint;

/// Distance from `p` to the segment `a`-`b` (projection clamped to the
/// segment). Falls back to point distance when `a == b`, which happens for
/// closed loops.
pub fn segment_distance(p: &PlanarPoint, a: &PlanarPoint, b: &PlanarPoint) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx * dx + dy * dy;
    if length_sq == 0.0 {
        return p.distance_to(a);
    }

    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
    let closest = PlanarPoint::new(a.x + t * dx, a.y + t * dy);
    p.distance_to(&closest)
}

/// Keep mask for `points` under tolerance `epsilon`. The first and last
/// entries are always `true`.
pub fn rdp_mask(points: &[PlanarPoint], epsilon: f64) -> Vec<bool> {
    let n = points.len();
    let mut keep = vec![false; n];
    if n == 0 {
        return keep;
    }
    keep[0] = true;
    keep[n - 1] = true;
    if n <= 2 {
        return keep;
    }

    let mut stack = vec![(0usize, n - 1)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }

        let (a, b) = (&points[start], &points[end]);
        let mut max_distance = 0.0;
        let mut max_index = start;
        for (offset, p) in points[start + 1..end].iter().enumerate() {
            let d = segment_distance(p, a, b);
            if d > max_distance {
                max_distance = d;
                max_index = start + 1 + offset;
            }
        }

        if max_distance > epsilon {
            keep[max_index] = true;
            stack.push((max_index, end));
            stack.push((start, max_index));
        }
    }

    keep
}

/// Indices of the points kept by Douglas–Peucker, ascending.
pub fn rdp_indices(points: &[PlanarPoint], epsilon: f64) -> Vec<usize> {
    rdp_mask(points, epsilon)
        .into_iter()
        .enumerate()
        .filter_map(|(i, k)| k.then_some(i))
        .collect()
}

/// Simplify `points` so that no dropped point lies further than `epsilon`
/// from the output polyline. Inputs of two points or fewer come back as-is.
pub fn rdp(points: &[PlanarPoint], epsilon: f64) -> Vec<PlanarPoint> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    rdp_indices(points, epsilon)
        .into_iter()
        .map(|i| points[i])
        .collect()
}

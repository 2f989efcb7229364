//! Route geometry: polyline simplification and canvas fitting.
//!
//! Everything here is pure and synchronous. The parallel simplifier uses the
//! global rayon pool and never suspends.

pub mod fit;
pub mod simplify;

pub use fit::{fit, fit_transform, FitResult};
pub use simplify::{
    adaptive, budget, curvature_sample, parallel_rdp, parallel_rdp_with, rdp, simplify,
    simplify_for_canvas, simplify_with, Complexity, ParallelConfig, SimplifyParams, Strategy,
};

//! Route poster rendering service.
//!
//! Orchestrates the synchronous crates into one async render:
//! - [`PosterPipeline`]: project, fit, simplify, produce layers concurrently,
//!   composite, and cache the result
//! - [`BasemapProvider`]: the external map imagery collaborator
//! - [`PipelineConfig`]: environment-driven cache and simplification settings
//! - [`input`]: route file parsing for the command-line front-end

pub mod basemap;
pub mod config;
pub mod input;
pub mod pipeline;

pub use basemap::{BasemapProvider, NoBasemap, StaticBasemap};
pub use config::PipelineConfig;
pub use input::{parse_route_json, read_route_file};
pub use pipeline::{prepare_route, PipelineStats, PosterPipeline, PreparedRoute, RenderRequest};

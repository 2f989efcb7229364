//! Async render pipeline.
//!
//! One render runs as:
//!
//! 1. Project the route and fit the full projected bounding box into the
//!    canvas route rectangle. Simplify with a tolerance derived from the fit
//!    scale, then map the kept points into canvas pixels.
//! 2. Produce the basemap and the route layer concurrently and join both.
//! 3. Composite in the fixed back-to-front order.
//!
//! Geometry and rasterisation run on the blocking pool so the runtime only
//! ever waits on the basemap provider and the disk cache. A missing, failed
//! or slow basemap degrades to the flat background.
//!
//! Cancellation is checked before every stage and again on the blocking pool
//! before each task starts, so a cancelled render stops at the next stage
//! boundary and is never composed or cached.

use geometry::{fit_transform, simplify_for_canvas, ParallelConfig, SimplifyParams};
use poster_common::{
    BoundingBox, GeoPoint, PlanarPoint, PosterError, PosterImage, PosterResult, PosterStyle, Rect,
    Route, Transform,
};
use projection::{GeoRegion, LocalProjection};
use renderer::{basemap_layer, compose, render_route_layer, CanvasSpec, RenderLayer, TextBlock, TextRenderer, Units};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use storage::{ArtifactCache, CacheKey};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::basemap::BasemapProvider;
use crate::config::{PipelineConfig, DEFAULT_BASEMAP_TIMEOUT};

/// Everything that determines a poster's pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub route: Route,
    pub spec: CanvasSpec,
    pub style: PosterStyle,
    pub text: TextBlock,
}

impl RenderRequest {
    pub fn new(route: Route, spec: CanvasSpec, style: PosterStyle, text: TextBlock) -> Self {
        Self {
            route,
            spec,
            style,
            text,
        }
    }

    /// Request whose metrics band is derived from the route itself.
    pub fn for_route(
        route: Route,
        spec: CanvasSpec,
        style: PosterStyle,
        title: impl Into<String>,
        units: Units,
    ) -> Self {
        let text = TextBlock::from_route(title, &route, units);
        Self::new(route, spec, style, text)
    }
}

/// Route geometry ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRoute {
    /// Simplified points in canvas pixels.
    pub points: Vec<PlanarPoint>,
    /// Planar route space to canvas pixels.
    pub transform: Transform,
    pub projection: Option<LocalProjection>,
    /// Geographic window exactly covered by the map rectangle.
    pub region: Option<GeoRegion>,
    pub input_points: usize,
}

/// Geographic window under `rect`, found by running its corners back through
/// the fit and the projection.
fn region_under(rect: &Rect, transform: &Transform, projection: &LocalProjection) -> Option<GeoRegion> {
    let top_left = transform.invert(PlanarPoint::new(rect.min_x(), rect.min_y()))?;
    let bottom_right = transform.invert(PlanarPoint::new(rect.max_x(), rect.max_y()))?;
    Some(GeoRegion::from_corners(
        projection.inverse(&top_left),
        projection.inverse(&bottom_right),
    ))
}

/// Project, fit and simplify a route for `spec`.
///
/// The fit is computed from the unsimplified route so simplification never
/// moves the framing. An empty route yields no points and no region.
pub fn prepare_route(
    points: &[GeoPoint],
    spec: &CanvasSpec,
    parallel: &ParallelConfig,
) -> PosterResult<PreparedRoute> {
    let target = spec.route_rect();
    let Some(projection) = LocalProjection::for_points(points) else {
        return Ok(PreparedRoute {
            points: Vec::new(),
            transform: Transform::new(1.0, target.center()),
            projection: None,
            region: None,
            input_points: 0,
        });
    };

    let planar = projection.forward_all(points);
    let transform = match BoundingBox::from_points(&planar) {
        Some(bbox) => fit_transform(&bbox, &target)?,
        None => Transform::new(1.0, target.center()),
    };
    let params = SimplifyParams::for_canvas(spec.quality(), transform.scale);
    let simplified = simplify_for_canvas(&planar, &params, parallel)?;

    Ok(PreparedRoute {
        points: transform.apply_all(&simplified),
        region: region_under(&spec.map_rect(), &transform, &projection),
        transform,
        projection: Some(projection),
        input_points: points.len(),
    })
}

fn checkpoint(cancel: &CancellationToken) -> PosterResult<()> {
    if cancel.is_cancelled() {
        Err(PosterError::Cancelled)
    } else {
        Ok(())
    }
}

fn join_error(stage: &str) -> impl FnOnce(tokio::task::JoinError) -> PosterError + '_ {
    move |e| PosterError::Render(format!("{} task failed: {}", stage, e))
}

/// Pipeline activity counters.
#[derive(Debug, Default)]
pub struct PipelineStats {
    /// Renders that reached the producer (cache misses and uncached renders).
    pub renders_started: AtomicU64,
    /// Renders that entered the compositing stage.
    pub composed: AtomicU64,
    pub renders_cancelled: AtomicU64,
}

/// Render pipeline with an optional artifact cache.
pub struct PosterPipeline {
    basemap: Arc<dyn BasemapProvider>,
    cache: Option<ArtifactCache>,
    parallel: ParallelConfig,
    basemap_timeout: Duration,
    stats: Arc<PipelineStats>,
}

impl PosterPipeline {
    /// Uncached pipeline with default settings.
    pub fn new(basemap: Arc<dyn BasemapProvider>) -> Self {
        Self {
            basemap,
            cache: None,
            parallel: ParallelConfig::default(),
            basemap_timeout: DEFAULT_BASEMAP_TIMEOUT,
            stats: Arc::new(PipelineStats::default()),
        }
    }

    pub async fn from_config(config: &PipelineConfig, basemap: Arc<dyn BasemapProvider>) -> Self {
        let cache = if config.cache_enabled {
            Some(ArtifactCache::from_config(&config.cache).await)
        } else {
            None
        };
        Self {
            basemap,
            cache,
            parallel: config.parallel,
            basemap_timeout: config.basemap_timeout,
            stats: Arc::new(PipelineStats::default()),
        }
    }

    pub fn with_cache(mut self, cache: ArtifactCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_basemap_timeout(mut self, timeout: Duration) -> Self {
        self.basemap_timeout = timeout;
        self
    }

    pub fn cache(&self) -> Option<&ArtifactCache> {
        self.cache.as_ref()
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Fingerprint of `request` with this pipeline's basemap source.
    pub fn cache_key(&self, request: &RenderRequest) -> CacheKey {
        CacheKey::for_render(
            request.route.points(),
            &request.text,
            &request.style,
            &request.spec,
            &self.basemap.cache_tag(),
        )
    }

    /// Render through the cache (when configured).
    ///
    /// Cancelling `cancel` abandons the render with [`PosterError::Cancelled`]
    /// at the next stage boundary, or immediately while queued behind another
    /// render of the same poster. Nothing is cached for a cancelled render.
    pub async fn render(
        &self,
        request: &RenderRequest,
        cancel: &CancellationToken,
    ) -> PosterResult<PosterImage> {
        request.style.validate()?;
        let result = match &self.cache {
            Some(cache) => {
                let key = self.cache_key(request);
                cache
                    .get_or_render_until(key, cancel.cancelled(), || self.produce(request, cancel))
                    .await
                    .map(|(image, _)| image)
            }
            None => self.produce(request, cancel).await,
        };

        if matches!(result, Err(PosterError::Cancelled)) {
            debug!("Render cancelled");
            self.stats.renders_cancelled.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("poster_renders_cancelled_total").increment(1);
        }
        result
    }

    async fn produce(&self, request: &RenderRequest, cancel: &CancellationToken) -> PosterResult<PosterImage> {
        checkpoint(cancel)?;
        self.stats.renders_started.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();
        let spec = request.spec;

        let points = request.route.points().to_vec();
        let parallel = self.parallel;
        let token = cancel.clone();
        let prepared = tokio::task::spawn_blocking(move || {
            checkpoint(&token)?;
            prepare_route(&points, &spec, &parallel)
        })
        .await
        .map_err(join_error("geometry"))??;
        checkpoint(cancel)?;
        let drawn_points = prepared.points.len();

        let route_points = prepared.points;
        let style = request.style.clone();
        let token = cancel.clone();
        let route_task = tokio::task::spawn_blocking(move || {
            checkpoint(&token)?;
            render_route_layer(&spec, &route_points, &style)
        });
        let (basemap, route) = tokio::join!(
            self.basemap_layer(prepared.region.as_ref(), &spec, cancel),
            route_task
        );
        let route = route.map_err(join_error("route layer"))??;
        checkpoint(cancel)?;
        let has_basemap = basemap.is_some();

        let style = request.style.clone();
        let text = request.text.clone();
        let token = cancel.clone();
        let stats = Arc::clone(&self.stats);
        let image = tokio::task::spawn_blocking(move || {
            checkpoint(&token)?;
            stats.composed.fetch_add(1, Ordering::Relaxed);
            let renderer = TextRenderer::from_style(&style);
            compose(&spec, &style, basemap.as_ref(), &route, &text, &renderer)
        })
        .await
        .map_err(join_error("compose"))??;

        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        metrics::counter!("poster_renders_total", "quality" => spec.quality().as_str()).increment(1);
        info!(
            width = spec.width(),
            height = spec.height(),
            quality = spec.quality().as_str(),
            input_points = prepared.input_points,
            drawn_points = drawn_points,
            basemap = has_basemap,
            duration_ms = duration_ms,
            "Rendered poster"
        );
        Ok(image)
    }

    /// Fetch and rasterise the basemap. Every failure is logged and becomes
    /// `None`.
    async fn basemap_layer(
        &self,
        region: Option<&GeoRegion>,
        spec: &CanvasSpec,
        cancel: &CancellationToken,
    ) -> Option<RenderLayer> {
        let region = region?;
        let size = spec.basemap_pixel_size();
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return None,
            fetched = tokio::time::timeout(self.basemap_timeout, self.basemap.fetch(region, size)) => fetched,
        };

        let image = match fetched {
            Ok(Ok(Some(image))) => image,
            Ok(Ok(None)) => return None,
            Ok(Err(e)) => {
                warn!(error = %e, "Basemap fetch failed, using flat background");
                metrics::counter!("poster_basemap_fallbacks_total", "reason" => "error").increment(1);
                return None;
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.basemap_timeout.as_millis() as u64,
                    "Basemap fetch timed out, using flat background"
                );
                metrics::counter!("poster_basemap_fallbacks_total", "reason" => "timeout").increment(1);
                return None;
            }
        };

        if cancel.is_cancelled() {
            return None;
        }
        let placement = spec.map_rect();
        match tokio::task::spawn_blocking(move || basemap_layer(&image, placement)).await {
            Ok(Ok(layer)) => Some(layer),
            Ok(Err(e)) => {
                warn!(error = %e, "Basemap unusable, using flat background");
                None
            }
            Err(e) => {
                warn!(error = %e, "Basemap task failed, using flat background");
                None
            }
        }
    }
}

//! Route poster renderer.
//!
//! Reads a JSON route file, renders a poster and writes it as PNG.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use poster_common::{PosterStyle, RenderQuality};
use poster_render::{
    read_route_file, BasemapProvider, NoBasemap, PipelineConfig, PosterPipeline, RenderRequest,
    StaticBasemap,
};
use renderer::{encode_png, CanvasSpec, Units};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum UnitsArg {
    Metric,
    Imperial,
}

impl From<UnitsArg> for Units {
    fn from(value: UnitsArg) -> Self {
        match value {
            UnitsArg::Metric => Units::Metric,
            UnitsArg::Imperial => Units::Imperial,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "poster-render")]
#[command(about = "Render a route poster to PNG")]
struct Args {
    /// Route file (JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Output PNG path
    #[arg(short, long, default_value = "poster.png")]
    output: PathBuf,

    /// Style file (YAML or JSON)
    #[arg(short, long)]
    style: Option<PathBuf>,

    /// Canvas width in pixels
    #[arg(long, default_value_t = 1800)]
    width: u32,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 2400)]
    height: u32,

    /// Render quality: preview, standard or export
    #[arg(short, long, default_value = "standard")]
    quality: RenderQuality,

    /// Poster title
    #[arg(short, long, default_value = "")]
    title: String,

    /// Units for the metrics band
    #[arg(long, value_enum, default_value = "metric")]
    units: UnitsArg,

    /// Raster image drawn behind the route
    #[arg(long)]
    basemap: Option<PathBuf>,

    /// Persistent cache directory (overrides POSTER_CACHE_DIR)
    #[arg(long, env = "POSTER_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Disable the artifact cache
    #[arg(long)]
    no_cache: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Number of tokio worker threads (default: number of CPU cores)
    #[arg(long)]
    worker_threads: Option<usize>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    } else if let Some(threads) = env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
    {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(args))
}

fn init_tracing(level: &str, json: bool) -> Result<()> {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder().with_max_level(level);
    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

async fn async_main(args: Args) -> Result<()> {
    init_tracing(&args.log_level, args.log_json)?;

    let style = match &args.style {
        Some(path) => PosterStyle::from_file(path)
            .with_context(|| format!("loading style {}", path.display()))?,
        None => PosterStyle::default(),
    };
    let route = read_route_file(&args.input)
        .await
        .with_context(|| format!("loading route {}", args.input.display()))?;
    let spec = CanvasSpec::new(args.width, args.height, args.quality)?;

    let basemap: Arc<dyn BasemapProvider> = match &args.basemap {
        Some(path) => Arc::new(StaticBasemap::from_file(path).await?),
        None => Arc::new(NoBasemap),
    };

    let mut config = PipelineConfig::from_env();
    if args.no_cache {
        config.cache_enabled = false;
    }
    if let Some(dir) = &args.cache_dir {
        config.cache.disk_dir = Some(dir.clone());
    }
    let pipeline = PosterPipeline::from_config(&config, basemap).await;

    info!(
        points = route.len(),
        width = spec.width(),
        height = spec.height(),
        quality = spec.quality().as_str(),
        cache = config.cache_enabled,
        "Rendering poster"
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling render");
            on_interrupt.cancel();
        }
    });

    let request = RenderRequest::for_route(route, spec, style, args.title.clone(), args.units.into());
    let image = pipeline.render(&request, &cancel).await?;

    let png = tokio::task::spawn_blocking(move || encode_png(&image)).await??;
    tokio::fs::write(&args.output, &png)
        .await
        .with_context(|| format!("writing {}", args.output.display()))?;

    info!(path = %args.output.display(), bytes = png.len(), "Wrote poster");
    Ok(())
}

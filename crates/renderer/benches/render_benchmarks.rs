//! Benchmarks for poster rasterization, compositing and PNG encoding.
//!
//! Run with: cargo bench --package renderer --bench render_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use geometry::fit;
use poster_common::{PlanarPoint, PosterImage, PosterStyle, RenderQuality};
use projection::project;
use renderer::{encode_png, render_poster, render_route_layer, CanvasSpec, Metric, TextBlock};
use test_utils::{canvas, create_test_rgba_pixels, gps_track, places};

fn fitted_track(spec: &CanvasSpec, n: usize) -> Vec<PlanarPoint> {
    let planar = project(&gps_track(n, places::PARIS, 9));
    fit(&planar, &spec.route_rect()).map(|f| f.points).unwrap_or_default()
}

fn text() -> TextBlock {
    TextBlock {
        title: "Benchmark Loop".to_string(),
        metrics: vec![
            Metric::new("Distance", "42.2 km"),
            Metric::new("Elevation", "512 m"),
            Metric::new("Time", "3:12:45"),
        ],
    }
}

// =============================================================================
// ROUTE LAYER
// =============================================================================

fn bench_route_layer(c: &mut Criterion) {
    let mut group = c.benchmark_group("route_layer");
    let (w, h) = canvas::PREVIEW;
    let spec = CanvasSpec::new(w, h, RenderQuality::Standard).unwrap();
    let style = PosterStyle {
        direction_tick_stride: Some(50),
        inner_stroke: true,
        ..PosterStyle::default()
    };

    for points in [800usize, 2_000, 6_000] {
        let track = fitted_track(&spec, points);
        group.throughput(Throughput::Elements(points as u64));
        group.bench_with_input(BenchmarkId::from_parameter(points), &track, |b, track| {
            b.iter(|| render_route_layer(&spec, black_box(track), &style));
        });
    }

    group.finish();
}

// =============================================================================
// FULL POSTER
// =============================================================================

fn bench_render_poster(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_poster");
    group.sample_size(20);

    for (name, (w, h), quality) in [
        ("thumbnail", canvas::THUMBNAIL, RenderQuality::Preview),
        ("preview", canvas::PREVIEW, RenderQuality::Preview),
        ("square", canvas::SQUARE, RenderQuality::Standard),
    ] {
        let spec = CanvasSpec::new(w, h, quality).unwrap();
        let track = fitted_track(&spec, quality.point_budget());
        let (bw, bh) = spec.basemap_pixel_size();
        let basemap = PosterImage::new(bw, bh, create_test_rgba_pixels(bw as usize, bh as usize)).unwrap();
        let style = PosterStyle::default();

        group.throughput(Throughput::Elements(w as u64 * h as u64));
        group.bench_function(BenchmarkId::new("flat", name), |b| {
            b.iter(|| render_poster(&spec, black_box(&track), &style, None, &text()));
        });
        group.bench_function(BenchmarkId::new("basemap", name), |b| {
            b.iter(|| render_poster(&spec, black_box(&track), &style, Some(&basemap), &text()));
        });
    }

    group.finish();
}

// =============================================================================
// PNG ENCODING
// =============================================================================

fn bench_png(c: &mut Criterion) {
    let mut group = c.benchmark_group("png_encode");
    let (w, h) = canvas::PREVIEW;
    let spec = CanvasSpec::new(w, h, RenderQuality::Preview).unwrap();
    let track = fitted_track(&spec, 2_000);

    let flat = render_poster(&spec, &track, &PosterStyle::default(), None, &text()).unwrap();
    let photo = PosterImage::new(w, h, create_test_rgba_pixels(w as usize, h as usize)).unwrap();

    group.throughput(Throughput::Bytes(flat.byte_size() as u64));
    group.bench_function("flat_poster", |b| b.iter(|| encode_png(black_box(&flat))));
    group.bench_function("full_color", |b| b.iter(|| encode_png(black_box(&photo))));

    group.finish();
}

criterion_group!(benches, bench_route_layer, bench_render_poster, bench_png);
criterion_main!(benches);

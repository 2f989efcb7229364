//! End-to-end rendering of fitted routes into posters.

use geometry::{fit, rdp};
use poster_common::{GeoPoint, PlanarPoint, PosterImage, PosterStyle, RenderQuality};
use projection::project;
use renderer::{decode_png, encode_png, render_poster, CanvasSpec, Metric, TextBlock};
use test_utils::{canvas, create_test_rgba_pixels, geo_loop, places};

fn fitted(spec: &CanvasSpec, route: &[GeoPoint]) -> Vec<PlanarPoint> {
    let planar = project(route);
    fit(&rdp(&planar, 1e-6), &spec.route_rect()).unwrap().points
}

fn sample_text() -> TextBlock {
    TextBlock {
        title: "Loop around Paris".to_string(),
        metrics: vec![Metric::new("Distance", "12.4 km"), Metric::new("Time", "1:02:03")],
    }
}

// ============================================================================
// Degenerate geometry
// ============================================================================

#[test]
fn test_degenerate_routes_produce_full_size_images() {
    let (w, h) = canvas::THUMBNAIL;
    let spec = CanvasSpec::new(w, h, RenderQuality::Preview).unwrap();
    let style = PosterStyle::default();

    let repeated = vec![places::PARIS; 25];
    let vertical: Vec<GeoPoint> = (0..25)
        .map(|i| GeoPoint::new(places::PARIS.latitude + i as f64 * 1e-3, places::PARIS.longitude))
        .collect();
    let empty: Vec<GeoPoint> = Vec::new();

    for route in [repeated, vertical, empty] {
        let points = fitted(&spec, &route);
        let image = render_poster(&spec, &points, &style, None, &sample_text()).unwrap();
        assert_eq!((image.width(), image.height()), (w, h));
        assert_eq!(image.byte_size(), PosterImage::estimate_size(w, h));
    }
}

#[test]
fn test_repeated_point_draws_centered_dot() {
    let spec = CanvasSpec::new(400, 400, RenderQuality::Standard).unwrap();
    let style = PosterStyle {
        show_markers: false,
        ..PosterStyle::default()
    };
    let points = fitted(&spec, &[places::TROMSO; 10]);
    let image = render_poster(&spec, &points, &style, None, &TextBlock::default()).unwrap();

    let (cx, cy) = spec.route_rect().center();
    let c = style.route_color;
    assert_eq!(image.pixel(cx as u32, cy as u32), Some([c.r, c.g, c.b, 255]));
}

// ============================================================================
// Composition
// ============================================================================

#[test]
fn test_route_drawn_over_basemap() {
    let (w, h) = canvas::PREVIEW;
    let spec = CanvasSpec::new(w, h, RenderQuality::Preview).unwrap();
    let style = PosterStyle {
        stroke_width: 12.0,
        show_markers: false,
        ..PosterStyle::default()
    };
    let (bw, bh) = spec.basemap_pixel_size();
    let basemap = PosterImage::new(bw, bh, create_test_rgba_pixels(bw as usize, bh as usize)).unwrap();

    let route = geo_loop(200, places::PARIS, 0.02);
    let points = fitted(&spec, &route);
    let image = render_poster(&spec, &points, &style, Some(&basemap), &sample_text()).unwrap();

    // A point on the loop carries the route color.
    let on_route = points[points.len() / 4];
    let c = style.route_color;
    assert_eq!(
        image.pixel(on_route.x as u32, on_route.y as u32),
        Some([c.r, c.g, c.b, 255])
    );

    // The loop's centre shows the basemap, not the background.
    let (cx, cy) = spec.route_rect().center();
    assert_ne!(image.pixel(cx as u32, cy as u32), Some(style.background.to_array()));
}

#[test]
fn test_render_is_deterministic() {
    let spec = CanvasSpec::new(300, 400, RenderQuality::Preview).unwrap();
    let points = fitted(&spec, &geo_loop(120, places::CAPE_TOWN, 0.05));
    let a = render_poster(&spec, &points, &PosterStyle::default(), None, &sample_text()).unwrap();
    let b = render_poster(&spec, &points, &PosterStyle::default(), None, &sample_text()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_poster_survives_png_round_trip() {
    let spec = CanvasSpec::new(240, 320, RenderQuality::Preview).unwrap();
    let points = fitted(&spec, &geo_loop(80, places::PARIS, 0.01));
    let image = render_poster(&spec, &points, &PosterStyle::default(), None, &sample_text()).unwrap();

    let png = encode_png(&image).unwrap();
    assert_eq!(decode_png(&png).unwrap(), image);
}

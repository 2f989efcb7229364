//! Route stroke rasterization.
//!
//! The route is drawn into its own transparent layer covering the map
//! rectangle. Points arrive in canvas pixel coordinates (already fitted), so
//! the layer only translates by the map origin.

use poster_common::{Color, LineCap, PlanarPoint, PosterError, PosterResult, PosterStyle, Rect};
use tiny_skia::{FillRule, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};
use tracing::debug;

use crate::layout::CanvasSpec;

/// Inner stroke width relative to the main stroke.
const INNER_STROKE_RATIO: f32 = 0.35;
/// Start/finish marker radius relative to the stroke width.
const MARKER_RADIUS_RATIO: f32 = 1.6;
/// Dot radius for a single-point route relative to the stroke width.
const DOT_RADIUS_RATIO: f32 = 1.5;
/// Direction tick arm length relative to the stroke width.
const TICK_LENGTH_RATIO: f32 = 2.0;

/// A rasterized layer and where it lands on the canvas.
pub struct RenderLayer {
    pub pixmap: Pixmap,
    /// Canvas-space rectangle covered by the layer.
    pub placement: Rect,
}

impl RenderLayer {
    /// An empty transparent layer covering `placement` (at least 1x1).
    pub fn transparent(placement: Rect) -> PosterResult<Self> {
        let width = placement.width.round().max(1.0) as u32;
        let height = placement.height.round().max(1.0) as u32;
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            PosterError::ResourceExhausted(format!("cannot allocate {}x{} layer", width, height))
        })?;
        Ok(Self { pixmap, placement })
    }

    /// Canvas pixel of the layer's top-left corner.
    pub fn origin(&self) -> (i32, i32) {
        (self.placement.x.round() as i32, self.placement.y.round() as i32)
    }

    /// Transform from canvas coordinates into layer pixels.
    fn canvas_transform(&self) -> Transform {
        let (x, y) = self.origin();
        Transform::from_translate(-x as f32, -y as f32)
    }
}

pub(crate) fn paint_for(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn skia_cap(cap: LineCap) -> tiny_skia::LineCap {
    match cap {
        LineCap::Round => tiny_skia::LineCap::Round,
        LineCap::Square => tiny_skia::LineCap::Square,
        LineCap::Butt => tiny_skia::LineCap::Butt,
    }
}

fn polyline(points: &[PlanarPoint]) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x as f32, first.y as f32);
    for p in rest {
        pb.line_to(p.x as f32, p.y as f32);
    }
    pb.finish()
}

fn fill_circle(layer: &mut RenderLayer, center: PlanarPoint, radius: f32, color: Color) {
    let transform = layer.canvas_transform();
    if let Some(circle) = PathBuilder::from_circle(center.x as f32, center.y as f32, radius) {
        layer
            .pixmap
            .fill_path(&circle, &paint_for(color), FillRule::Winding, transform, None);
    }
}

/// Draw a chevron at `points[i]` pointing along the local direction of travel.
fn draw_tick(
    pb: &mut PathBuilder,
    prev: PlanarPoint,
    at: PlanarPoint,
    next: PlanarPoint,
    length: f32,
) {
    let dx = (next.x - prev.x) as f32;
    let dy = (next.y - prev.y) as f32;
    let norm = (dx * dx + dy * dy).sqrt();
    if norm <= f32::EPSILON {
        return;
    }
    let (ux, uy) = (dx / norm, dy / norm);
    let (x, y) = (at.x as f32, at.y as f32);
    // Arms sweep back from the apex at +-45 degrees.
    let back = length * std::f32::consts::FRAC_1_SQRT_2;
    pb.move_to(x - ux * back - uy * back, y - uy * back + ux * back);
    pb.line_to(x, y);
    pb.line_to(x - ux * back + uy * back, y - uy * back - ux * back);
}

/// Rasterize the route into a layer covering the canvas map rectangle.
///
/// `points` are canvas pixel coordinates. Distinct points are stroked with
/// the style's cap and a round join; a single (or repeated) point becomes a
/// dot; an empty route leaves the layer transparent. Markers are drawn
/// after the stroke so they sit on top.
pub fn render_route_layer(
    spec: &CanvasSpec,
    points: &[PlanarPoint],
    style: &PosterStyle,
) -> PosterResult<RenderLayer> {
    let mut layer = RenderLayer::transparent(spec.map_rect())?;
    let width = (style.stroke_width * spec.size_scale()).max(0.5) as f32;
    let transform = layer.canvas_transform();

    let Some(&first) = points.first() else {
        return Ok(layer);
    };
    if points.iter().all(|p| *p == first) {
        fill_circle(&mut layer, first, width * DOT_RADIUS_RATIO, style.route_color);
        return Ok(layer);
    }

    if let Some(path) = polyline(points) {
        let stroke = Stroke {
            width,
            line_cap: skia_cap(style.line_cap),
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        layer
            .pixmap
            .stroke_path(&path, &paint_for(style.route_color), &stroke, transform, None);

        if style.inner_stroke {
            let inner = Stroke {
                width: width * INNER_STROKE_RATIO,
                ..stroke.clone()
            };
            layer.pixmap.stroke_path(
                &path,
                &paint_for(style.route_inner_color),
                &inner,
                transform,
                None,
            );
        }
    }

    if let Some(stride) = style.direction_tick_stride.filter(|s| *s > 0) {
        let mut pb = PathBuilder::new();
        let mut ticks = 0usize;
        for i in (stride..points.len() - 1).step_by(stride) {
            draw_tick(&mut pb, points[i - 1], points[i], points[i + 1], width * TICK_LENGTH_RATIO);
            ticks += 1;
        }
        if let Some(path) = pb.finish() {
            let stroke = Stroke {
                width: (width * 0.5).max(0.5),
                line_cap: tiny_skia::LineCap::Round,
                line_join: LineJoin::Round,
                ..Stroke::default()
            };
            let color = if style.inner_stroke {
                style.route_inner_color
            } else {
                style.background
            };
            layer
                .pixmap
                .stroke_path(&path, &paint_for(color), &stroke, transform, None);
        }
        debug!(ticks = ticks, stride = stride, "Drew direction ticks");
    }

    if style.show_markers {
        let radius = width * MARKER_RADIUS_RATIO;
        let ring = radius + (width * 0.4).max(1.0);
        let last = points[points.len() - 1];
        // Finish first so a closed loop shows its start marker.
        fill_circle(&mut layer, last, ring, Color::WHITE);
        fill_circle(&mut layer, last, radius, style.finish_color);
        fill_circle(&mut layer, first, ring, Color::WHITE);
        fill_circle(&mut layer, first, radius, style.start_color);
    }

    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use poster_common::RenderQuality;

    fn spec() -> CanvasSpec {
        CanvasSpec::new(400, 400, RenderQuality::Standard).unwrap()
    }

    fn alpha_at(layer: &RenderLayer, x: f64, y: f64) -> u8 {
        let lx = (x - layer.placement.x) as u32;
        let ly = (y - layer.placement.y) as u32;
        layer.pixmap.pixel(lx, ly).map(|p| p.alpha()).unwrap_or(0)
    }

    #[test]
    fn test_layer_covers_map_rect() {
        let spec = spec();
        let layer = render_route_layer(&spec, &[], &PosterStyle::default()).unwrap();
        assert_eq!(layer.placement, spec.map_rect());
        assert!(layer.pixmap.pixels().iter().all(|p| p.alpha() == 0));
    }

    #[test]
    fn test_stroke_covers_the_line() {
        let spec = spec();
        let map = spec.map_rect();
        let y = map.center().1;
        let points = [
            PlanarPoint::new(map.x + 20.0, y),
            PlanarPoint::new(map.max_x() - 20.0, y),
        ];
        let style = PosterStyle {
            show_markers: false,
            stroke_width: 10.0,
            ..PosterStyle::default()
        };
        let layer = render_route_layer(&spec, &points, &style).unwrap();
        assert_eq!(alpha_at(&layer, map.center().0, y), 255);
        assert_eq!(alpha_at(&layer, map.center().0, y - 20.0), 0);
    }

    #[test]
    fn test_single_point_draws_dot() {
        let spec = spec();
        let (cx, cy) = spec.map_rect().center();
        let layer =
            render_route_layer(&spec, &[PlanarPoint::new(cx, cy)], &PosterStyle::default()).unwrap();
        assert!(alpha_at(&layer, cx, cy) > 0);
    }

    #[test]
    fn test_start_marker_drawn_over_stroke() {
        let spec = spec();
        let map = spec.map_rect();
        let y = map.center().1;
        let start = PlanarPoint::new(map.x + 30.0, y);
        let points = [start, PlanarPoint::new(map.max_x() - 30.0, y)];
        let style = PosterStyle::default();
        let layer = render_route_layer(&spec, &points, &style).unwrap();

        let px = layer
            .pixmap
            .pixel((start.x - map.x) as u32, (start.y - map.y) as u32)
            .unwrap()
            .demultiply();
        let c = style.start_color;
        assert_eq!((px.red(), px.green(), px.blue()), (c.r, c.g, c.b));
    }
}

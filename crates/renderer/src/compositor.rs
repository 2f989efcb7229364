//! Fixed-order poster compositing.
//!
//! Back to front: background fill, basemap raster (map rectangle only),
//! route layer (stroke, ticks, markers), band panels, text. The order does
//! not depend on which layer was produced first.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use poster_common::{Color, PlanarPoint, PosterError, PosterImage, PosterResult, PosterStyle, Rect};
use tiny_skia::{ColorU8, Pixmap, PixmapPaint, Transform};
use tracing::debug;

use crate::layout::CanvasSpec;
use crate::route::{paint_for, render_route_layer, RenderLayer};
use crate::text::{layout_text, TextBlock, TextRenderer};

fn skia_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

/// Convert a straight-alpha poster image into a layer covering `placement`,
/// resampling to the placement's pixel size when needed.
pub fn basemap_layer(image: &PosterImage, placement: Rect) -> PosterResult<RenderLayer> {
    let mut layer = RenderLayer::transparent(placement)?;
    let (width, height) = (layer.pixmap.width(), layer.pixmap.height());

    let source = RgbaImage::from_raw(image.width(), image.height(), image.pixels().to_vec())
        .ok_or_else(|| PosterError::Basemap("basemap buffer does not match its size".to_string()))?;
    let resized = if source.dimensions() == (width, height) {
        source
    } else {
        debug!(
            from_width = image.width(),
            from_height = image.height(),
            to_width = width,
            to_height = height,
            "Resampling basemap"
        );
        imageops::resize(&source, width, height, FilterType::Triangle)
    };

    for (dst, src) in layer.pixmap.pixels_mut().iter_mut().zip(resized.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(layer)
}

fn draw_layer(canvas: &mut Pixmap, layer: &RenderLayer) {
    let (x, y) = layer.origin();
    canvas.draw_pixmap(
        x,
        y,
        layer.pixmap.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
}

fn demultiply(canvas: &Pixmap) -> Vec<u8> {
    canvas
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect()
}

/// Composite prepared layers into the final straight-alpha poster.
pub fn compose(
    spec: &CanvasSpec,
    style: &PosterStyle,
    basemap: Option<&RenderLayer>,
    route: &RenderLayer,
    text: &TextBlock,
    renderer: &TextRenderer,
) -> PosterResult<PosterImage> {
    let (width, height) = (spec.width(), spec.height());
    let mut canvas = Pixmap::new(width, height).ok_or_else(|| {
        PosterError::ResourceExhausted(format!("cannot allocate {}x{} canvas", width, height))
    })?;

    canvas.fill(skia_color(style.background));
    if let Some(basemap) = basemap {
        draw_layer(&mut canvas, basemap);
    }
    draw_layer(&mut canvas, route);

    let layout = layout_text(spec, style, text, renderer);
    let panel = paint_for(style.panel_color);
    for band in &layout.panels {
        if let Some(rect) =
            tiny_skia::Rect::from_xywh(band.x as f32, band.y as f32, band.width as f32, band.height as f32)
        {
            canvas.fill_rect(rect, &panel, Transform::identity(), None);
        }
    }
    renderer.draw_on_pixmap(&mut canvas, &layout.runs);

    let mut image = RgbaImage::from_raw(width, height, demultiply(&canvas))
        .ok_or_else(|| PosterError::Render("canvas buffer size mismatch".to_string()))?;
    renderer.draw_on_image(&mut image, &layout.runs);

    PosterImage::new(width, height, image.into_raw())
}

/// Rasterize and composite in one call, for callers that already hold the
/// fitted route points and the basemap image.
pub fn render_poster(
    spec: &CanvasSpec,
    points: &[PlanarPoint],
    style: &PosterStyle,
    basemap: Option<&PosterImage>,
    text: &TextBlock,
) -> PosterResult<PosterImage> {
    let route = render_route_layer(spec, points, style)?;
    let basemap = basemap
        .map(|image| basemap_layer(image, spec.map_rect()))
        .transpose()?;
    let renderer = TextRenderer::from_style(style);
    compose(spec, style, basemap.as_ref(), &route, text, &renderer)
}

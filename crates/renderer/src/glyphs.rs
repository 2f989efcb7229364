//! Stroked vector glyphs used when no TrueType font is configured.
//!
//! Each glyph is a set of polylines in a unit cell: x in `[0, 1]` across the
//! glyph width, y in `[0, 1]` from cap height down to the baseline. Lowercase
//! letters are drawn with their uppercase shapes. Unknown characters advance
//! the pen but draw nothing.

use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

/// Glyph width as a fraction of the font size.
const GLYPH_WIDTH: f32 = 0.5;
/// Distance between glyph origins as a fraction of the font size.
const ADVANCE: f32 = 0.72;
/// Cap height as a fraction of the font size.
const CAP_HEIGHT: f32 = 0.7;
/// Stroke width as a fraction of the font size.
const STROKE: f32 = 0.09;

type Strokes = &'static [&'static [(f32, f32)]];

const RING: &[(f32, f32)] = &[
    (0.2, 0.0),
    (0.8, 0.0),
    (1.0, 0.2),
    (1.0, 0.8),
    (0.8, 1.0),
    (0.2, 1.0),
    (0.0, 0.8),
    (0.0, 0.2),
    (0.2, 0.0),
];
const P_BOWL: &[(f32, f32)] = &[
    (0.0, 1.0),
    (0.0, 0.0),
    (0.8, 0.0),
    (1.0, 0.15),
    (1.0, 0.4),
    (0.8, 0.55),
    (0.0, 0.55),
];

fn strokes_for(ch: char) -> Strokes {
    match ch.to_ascii_uppercase() {
        'A' => &[&[(0.0, 1.0), (0.5, 0.0), (1.0, 1.0)], &[(0.2, 0.6), (0.8, 0.6)]],
        'B' => &[
            &[(0.0, 0.0), (0.0, 1.0), (0.75, 1.0), (1.0, 0.85), (1.0, 0.65), (0.75, 0.5), (0.0, 0.5)],
            &[(0.0, 0.0), (0.7, 0.0), (0.9, 0.12), (0.9, 0.38), (0.7, 0.5)],
        ],
        'C' => &[&[
            (1.0, 0.1),
            (0.8, 0.0),
            (0.2, 0.0),
            (0.0, 0.2),
            (0.0, 0.8),
            (0.2, 1.0),
            (0.8, 1.0),
            (1.0, 0.9),
        ]],
        'D' => &[&[(0.0, 0.0), (0.0, 1.0), (0.6, 1.0), (1.0, 0.7), (1.0, 0.3), (0.6, 0.0), (0.0, 0.0)]],
        'E' => &[&[(1.0, 0.0), (0.0, 0.0), (0.0, 1.0), (1.0, 1.0)], &[(0.0, 0.5), (0.7, 0.5)]],
        'F' => &[&[(1.0, 0.0), (0.0, 0.0), (0.0, 1.0)], &[(0.0, 0.5), (0.7, 0.5)]],
        'G' => &[&[
            (1.0, 0.1),
            (0.8, 0.0),
            (0.2, 0.0),
            (0.0, 0.2),
            (0.0, 0.8),
            (0.2, 1.0),
            (0.8, 1.0),
            (1.0, 0.8),
            (1.0, 0.55),
            (0.55, 0.55),
        ]],
        'H' => &[&[(0.0, 0.0), (0.0, 1.0)], &[(1.0, 0.0), (1.0, 1.0)], &[(0.0, 0.5), (1.0, 0.5)]],
        'I' => &[&[(0.5, 0.0), (0.5, 1.0)], &[(0.2, 0.0), (0.8, 0.0)], &[(0.2, 1.0), (0.8, 1.0)]],
        'J' => &[&[(1.0, 0.0), (1.0, 0.8), (0.8, 1.0), (0.2, 1.0), (0.0, 0.8)]],
        'K' => &[&[(0.0, 0.0), (0.0, 1.0)], &[(1.0, 0.0), (0.0, 0.6)], &[(0.3, 0.4), (1.0, 1.0)]],
        'L' => &[&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)]],
        'M' => &[&[(0.0, 1.0), (0.0, 0.0), (0.5, 0.6), (1.0, 0.0), (1.0, 1.0)]],
        'N' => &[&[(0.0, 1.0), (0.0, 0.0), (1.0, 1.0), (1.0, 0.0)]],
        'O' => &[RING],
        'P' => &[P_BOWL],
        'Q' => &[RING, &[(0.6, 0.7), (1.0, 1.05)]],
        'R' => &[P_BOWL, &[(0.4, 0.55), (1.0, 1.0)]],
        'S' => &[&[
            (1.0, 0.1),
            (0.8, 0.0),
            (0.2, 0.0),
            (0.0, 0.15),
            (0.0, 0.35),
            (0.2, 0.5),
            (0.8, 0.5),
            (1.0, 0.65),
            (1.0, 0.85),
            (0.8, 1.0),
            (0.2, 1.0),
            (0.0, 0.9),
        ]],
        'T' => &[&[(0.0, 0.0), (1.0, 0.0)], &[(0.5, 0.0), (0.5, 1.0)]],
        'U' => &[&[(0.0, 0.0), (0.0, 0.8), (0.2, 1.0), (0.8, 1.0), (1.0, 0.8), (1.0, 0.0)]],
        'V' => &[&[(0.0, 0.0), (0.5, 1.0), (1.0, 0.0)]],
        'W' => &[&[(0.0, 0.0), (0.25, 1.0), (0.5, 0.4), (0.75, 1.0), (1.0, 0.0)]],
        'X' => &[&[(0.0, 0.0), (1.0, 1.0)], &[(1.0, 0.0), (0.0, 1.0)]],
        'Y' => &[&[(0.0, 0.0), (0.5, 0.5), (1.0, 0.0)], &[(0.5, 0.5), (0.5, 1.0)]],
        'Z' => &[&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)]],
        '0' => &[RING, &[(0.8, 0.15), (0.2, 0.85)]],
        '1' => &[&[(0.25, 0.2), (0.55, 0.0), (0.55, 1.0)], &[(0.25, 1.0), (0.85, 1.0)]],
        '2' => &[&[(0.0, 0.2), (0.2, 0.0), (0.8, 0.0), (1.0, 0.2), (1.0, 0.4), (0.0, 1.0), (1.0, 1.0)]],
        '3' => &[
            &[(0.0, 0.1), (0.2, 0.0), (0.8, 0.0), (1.0, 0.15), (1.0, 0.35), (0.8, 0.5), (0.3, 0.5)],
            &[(0.8, 0.5), (1.0, 0.65), (1.0, 0.85), (0.8, 1.0), (0.2, 1.0), (0.0, 0.9)],
        ],
        '4' => &[&[(0.75, 1.0), (0.75, 0.0), (0.0, 0.7), (1.0, 0.7)]],
        '5' => &[&[
            (1.0, 0.0),
            (0.0, 0.0),
            (0.0, 0.45),
            (0.8, 0.45),
            (1.0, 0.6),
            (1.0, 0.85),
            (0.8, 1.0),
            (0.2, 1.0),
            (0.0, 0.9),
        ]],
        '6' => &[&[
            (0.9, 0.0),
            (0.3, 0.0),
            (0.0, 0.3),
            (0.0, 0.8),
            (0.2, 1.0),
            (0.8, 1.0),
            (1.0, 0.8),
            (1.0, 0.65),
            (0.8, 0.45),
            (0.2, 0.45),
            (0.0, 0.6),
        ]],
        '7' => &[&[(0.0, 0.0), (1.0, 0.0), (0.35, 1.0)]],
        '8' => &[
            &[(0.2, 0.5), (0.0, 0.35), (0.0, 0.15), (0.2, 0.0), (0.8, 0.0), (1.0, 0.15), (1.0, 0.35), (0.8, 0.5), (0.2, 0.5)],
            &[(0.2, 0.5), (0.0, 0.65), (0.0, 0.85), (0.2, 1.0), (0.8, 1.0), (1.0, 0.85), (1.0, 0.65), (0.8, 0.5)],
        ],
        '9' => &[&[
            (1.0, 0.4),
            (0.8, 0.55),
            (0.2, 0.55),
            (0.0, 0.4),
            (0.0, 0.2),
            (0.2, 0.0),
            (0.8, 0.0),
            (1.0, 0.2),
            (1.0, 0.7),
            (0.7, 1.0),
            (0.1, 1.0),
        ]],
        '.' => &[&[(0.45, 0.95), (0.55, 0.95)]],
        ',' => &[&[(0.55, 0.9), (0.4, 1.1)]],
        ':' => &[&[(0.45, 0.3), (0.55, 0.3)], &[(0.45, 0.9), (0.55, 0.9)]],
        '-' => &[&[(0.2, 0.55), (0.8, 0.55)]],
        '+' => &[&[(0.2, 0.55), (0.8, 0.55)], &[(0.5, 0.3), (0.5, 0.8)]],
        '/' => &[&[(0.1, 1.0), (0.9, 0.0)]],
        '\'' => &[&[(0.5, 0.0), (0.5, 0.25)]],
        '(' => &[&[(0.7, -0.05), (0.4, 0.25), (0.4, 0.75), (0.7, 1.05)]],
        ')' => &[&[(0.3, -0.05), (0.6, 0.25), (0.6, 0.75), (0.3, 1.05)]],
        '%' => &[
            &[(0.0, 1.0), (1.0, 0.0)],
            &[(0.1, 0.05), (0.3, 0.05), (0.3, 0.25), (0.1, 0.25), (0.1, 0.05)],
            &[(0.7, 0.75), (0.9, 0.75), (0.9, 0.95), (0.7, 0.95), (0.7, 0.75)],
        ],
        _ => &[],
    }
}

/// Whether `ch` has a drawn shape.
pub fn is_supported(ch: char) -> bool {
    !strokes_for(ch).is_empty()
}

/// Rendered width of `text` at `size`.
pub fn measure(text: &str, size: f32) -> f32 {
    let count = text.chars().count();
    if count == 0 {
        return 0.0;
    }
    (count - 1) as f32 * ADVANCE * size + GLYPH_WIDTH * size
}

/// Height from baseline to cap line at `size`.
pub fn cap_height(size: f32) -> f32 {
    CAP_HEIGHT * size
}

/// Draw `text` with its left edge at `x` and its baseline at `baseline`.
pub fn draw_text(pixmap: &mut Pixmap, text: &str, x: f32, baseline: f32, size: f32, paint: &Paint) {
    let width = GLYPH_WIDTH * size;
    let height = CAP_HEIGHT * size;
    let top = baseline - height;

    let stroke = Stroke {
        width: (STROKE * size).max(1.0),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };

    let mut pb = PathBuilder::new();
    for (i, ch) in text.chars().enumerate() {
        let origin = x + i as f32 * ADVANCE * size;
        for line in strokes_for(ch) {
            let mut points = line.iter().map(|&(gx, gy)| (origin + gx * width, top + gy * height));
            if let Some((x0, y0)) = points.next() {
                pb.move_to(x0, y0);
                for (px, py) in points {
                    pb.line_to(px, py);
                }
            }
        }
    }

    if let Some(path) = pb.finish() {
        pixmap.stroke_path(&path, paint, &stroke, Transform::identity(), None);
    }
}

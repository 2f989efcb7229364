//! Common test fixtures for route-poster tests.
//!
//! This module provides pre-defined test data that represents common
//! scenarios in poster rendering.

/// Reference locations for geographic routes.
pub mod places {
    use poster_common::GeoPoint;

    /// Central Paris
    pub const PARIS: GeoPoint = GeoPoint::new(48.8566, 2.3522);

    /// Cape Town (southern hemisphere)
    pub const CAPE_TOWN: GeoPoint = GeoPoint::new(-33.9249, 18.4241);

    /// Tromsø (high latitude, strong longitude compression)
    pub const TROMSO: GeoPoint = GeoPoint::new(69.6492, 18.9553);

    /// Null Island
    pub const ORIGIN: GeoPoint = GeoPoint::new(0.0, 0.0);
}

/// Canvas sizes commonly requested by callers.
pub mod canvas {
    /// Small preview thumbnail
    pub const THUMBNAIL: (u32, u32) = (120, 160);

    /// On-screen preview (3:4 portrait)
    pub const PREVIEW: (u32, u32) = (600, 800);

    /// 18x24 inch print at 300 dpi
    pub const PRINT_18X24: (u32, u32) = (5400, 7200);

    /// Square social-media format
    pub const SQUARE: (u32, u32) = (1080, 1080);
}

/// Serialized inputs.
pub mod documents {
    /// Style document overriding a handful of fields.
    pub const STYLE_YAML: &str = r##"
route_color: "#c0392b"
stroke_width: 6.0
inner_stroke: true
direction_tick_stride: 25
line_cap: square
"##;

    /// Minimal route file with elevation and time on every point.
    pub const ROUTE_JSON: &str = r#"{
  "points": [
    { "lat": 46.5500, "lon": 7.9800, "ele": 1200.0, "time": "2024-01-15T12:00:00Z" },
    { "lat": 46.5520, "lon": 7.9830, "ele": 1215.5, "time": "2024-01-15T12:02:00Z" },
    { "lat": 46.5545, "lon": 7.9870, "ele": 1240.0, "time": "2024-01-15T12:05:00Z" },
    { "lat": 46.5570, "lon": 7.9850, "ele": 1232.0, "time": "2024-01-15T12:09:00Z" }
  ]
}"#;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_places_are_valid() {
        for p in [places::PARIS, places::CAPE_TOWN, places::TROMSO, places::ORIGIN] {
            assert!(p.is_valid());
        }
    }

    #[test]
    fn test_canvas_sizes_are_portrait_or_square() {
        for (w, h) in [canvas::THUMBNAIL, canvas::PREVIEW, canvas::PRINT_18X24, canvas::SQUARE] {
            assert!(h >= w);
        }
    }
}

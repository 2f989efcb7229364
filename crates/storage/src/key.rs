//! Render fingerprints.
//!
//! A [`CacheKey`] is a 128-bit XXH3 digest over everything that affects a
//! poster's pixels: every coordinate (as IEEE-754 bits), the text block, the
//! canonical style, canvas size, quality tier and the basemap source. Fields
//! are length-prefixed so adjacent values cannot run together.

use std::fmt;
use std::str::FromStr;

use poster_common::{GeoPoint, PosterError, PosterStyle};
use renderer::{CanvasSpec, TextBlock};
use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x5f3a_92c1_7e04_b6d8;

/// Bumped whenever the rendering output for identical inputs changes.
pub const KEY_FORMAT_VERSION: u32 = 1;

/// Fingerprint of one render request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(u128);

impl CacheKey {
    pub fn from_u128(value: u128) -> Self {
        Self(value)
    }

    pub fn as_u128(&self) -> u128 {
        self.0
    }

    /// Fingerprint a full render request. `basemap` identifies the basemap
    /// source (e.g. `"none"` or a provider tag).
    pub fn for_render(
        points: &[GeoPoint],
        text: &TextBlock,
        style: &PosterStyle,
        spec: &CanvasSpec,
        basemap: &str,
    ) -> Self {
        let mut h = KeyHasher::new();
        h.write_u64(points.len() as u64);
        for p in points {
            h.write_f64(p.latitude);
            h.write_f64(p.longitude);
        }

        h.write_str(&text.title);
        h.write_u64(text.metrics.len() as u64);
        for metric in &text.metrics {
            h.write_str(&metric.label);
            h.write_str(&metric.value);
        }

        h.write_str(&style.canonical_json());
        h.write_u32(spec.width());
        h.write_u32(spec.height());
        h.write_str(spec.quality().as_str());
        h.write_str(basemap);
        h.finish()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl FromStr for CacheKey {
    type Err = PosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(PosterError::Cache(format!("invalid cache key '{}'", s)));
        }
        u128::from_str_radix(s, 16)
            .map(CacheKey)
            .map_err(|_| PosterError::Cache(format!("invalid cache key '{}'", s)))
    }
}

/// Streaming fingerprint builder.
pub struct KeyHasher {
    inner: Xxh3,
}

impl KeyHasher {
    pub fn new() -> Self {
        let mut inner = Xxh3::with_seed(XXH3_SEED);
        inner.update(&KEY_FORMAT_VERSION.to_le_bytes());
        Self { inner }
    }

    pub fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    pub fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    pub fn finish(self) -> CacheKey {
        CacheKey(self.inner.digest128())
    }
}

impl Default for KeyHasher {
    fn default() -> Self {
        Self::new()
    }
}

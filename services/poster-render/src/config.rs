//! Pipeline configuration.
//!
//! Everything has a default; environment variables override:
//!
//! | Variable | Default |
//! |---|---|
//! | `POSTER_CACHE_ENABLED` | `true` |
//! | `POSTER_CACHE_DIR` | unset (memory only) |
//! | `POSTER_CACHE_MAX_ENTRIES` | 50 |
//! | `POSTER_CACHE_MAX_MB` | 100 |
//! | `POSTER_CACHE_TTL_SECS` | 3600 |
//! | `POSTER_DISK_TTL_SECS` | 604800 |
//! | `POSTER_PARALLEL_THRESHOLD` | 1000 |
//! | `POSTER_PARALLEL_MIN_CHUNK` | 500 |
//! | `POSTER_BASEMAP_TIMEOUT_SECS` | 10 |

use geometry::ParallelConfig;
use std::path::PathBuf;
use std::time::Duration;
use storage::CacheConfig;

/// Default time a basemap fetch may take before the poster falls back to
/// the flat background.
pub const DEFAULT_BASEMAP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub cache_enabled: bool,
    pub cache: CacheConfig,
    pub parallel: ParallelConfig,
    pub basemap_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache: CacheConfig::default(),
            parallel: ParallelConfig::default(),
            basemap_timeout: DEFAULT_BASEMAP_TIMEOUT,
        }
    }
}

impl PipelineConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Unparseable values fall back to
    /// the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse_u64 = |key: &str, default: u64| -> u64 {
            lookup(key).and_then(|v| v.trim().parse().ok()).unwrap_or(default)
        };
        let parse_usize = |key: &str, default: usize| -> usize {
            lookup(key).and_then(|v| v.trim().parse().ok()).unwrap_or(default)
        };
        let parse_bool = |key: &str, default: bool| -> bool {
            lookup(key)
                .map(|v| {
                    let v = v.trim().to_lowercase();
                    v == "true" || v == "1"
                })
                .unwrap_or(default)
        };

        let defaults = Self::default();
        let cache = CacheConfig {
            max_entries: parse_usize("POSTER_CACHE_MAX_ENTRIES", defaults.cache.max_entries),
            max_bytes: parse_u64("POSTER_CACHE_MAX_MB", defaults.cache.max_bytes / (1024 * 1024))
                * 1024
                * 1024,
            ttl: Duration::from_secs(parse_u64("POSTER_CACHE_TTL_SECS", defaults.cache.ttl.as_secs())),
            disk_dir: lookup("POSTER_CACHE_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            disk_ttl: Duration::from_secs(parse_u64(
                "POSTER_DISK_TTL_SECS",
                defaults.cache.disk_ttl.as_secs(),
            )),
        };
        let parallel = ParallelConfig {
            threshold: parse_usize("POSTER_PARALLEL_THRESHOLD", defaults.parallel.threshold),
            min_chunk_size: parse_usize("POSTER_PARALLEL_MIN_CHUNK", defaults.parallel.min_chunk_size),
            ..defaults.parallel
        };

        Self {
            cache_enabled: parse_bool("POSTER_CACHE_ENABLED", defaults.cache_enabled),
            cache,
            parallel,
            basemap_timeout: Duration::from_secs(parse_u64(
                "POSTER_BASEMAP_TIMEOUT_SECS",
                defaults.basemap_timeout.as_secs(),
            )),
        }
    }
}

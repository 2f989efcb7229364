//! Poster artifact storage.
//!
//! Rendered posters are cached in two tiers keyed by a 128-bit render
//! fingerprint ([`CacheKey`]):
//! - [`MemoryCache`]: bounded LRU of decoded images with TTL
//! - [`DiskCache`]: PNG files in a directory, written atomically
//!
//! [`ArtifactCache`] layers the two and guarantees that concurrent requests
//! for the same key render at most once.

pub mod artifact;
pub mod disk;
pub mod key;
pub mod memory;

pub use artifact::{ArtifactCache, CacheConfig, CacheSource};
pub use disk::DiskCache;
pub use key::{CacheKey, KeyHasher};
pub use memory::{CacheEntry, MemoryCache, MemoryCacheStats};

//! In-memory LRU tier for rendered posters.
//!
//! ## Eviction
//!
//! Two ceilings apply at once:
//! - an entry-count ceiling, enforced by the LRU itself on insert
//! - a byte ceiling, enforced by evicting least-recently-used entries in a
//!   batch (at least ~5% of the limit) before an insert would overflow it
//!
//! Entries older than the TTL are dropped lazily when they are next read.
//!
//! ## Accounting
//!
//! An entry's size is its pixel buffer, `width * height * 4`.

use chrono::{DateTime, Utc};
use lru::LruCache;
use poster_common::PosterImage;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::key::CacheKey;

/// A cached poster. Never mutated after insertion.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub image: PosterImage,
    pub created_at: DateTime<Utc>,
    pub byte_size: usize,
    inserted_at: Instant,
}

impl CacheEntry {
    pub fn new(image: PosterImage) -> Self {
        let byte_size = PosterImage::estimate_size(image.width(), image.height());
        Self {
            image,
            created_at: Utc::now(),
            byte_size,
            inserted_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() > ttl
    }
}

/// Counters for the memory tier.
///
/// All fields are atomic for lock-free reads.
#[derive(Debug, Default)]
pub struct MemoryCacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    /// Entries evicted by either ceiling or by `evict_percentage`
    pub evictions: AtomicU64,
    /// Entries dropped because their TTL elapsed
    pub expired: AtomicU64,
    pub size_bytes: AtomicU64,
    pub entry_count: AtomicU64,
    pub eviction_runs: AtomicU64,
    pub bytes_evicted_total: AtomicU64,
}

impl MemoryCacheStats {
    /// Hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }

    pub fn entry_count(&self) -> u64 {
        self.entry_count.load(Ordering::Relaxed)
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    fn snapshot(&self) -> MemoryCacheStats {
        let copy = |v: &AtomicU64| AtomicU64::new(v.load(Ordering::Relaxed));
        MemoryCacheStats {
            hits: copy(&self.hits),
            misses: copy(&self.misses),
            evictions: copy(&self.evictions),
            expired: copy(&self.expired),
            size_bytes: copy(&self.size_bytes),
            entry_count: copy(&self.entry_count),
            eviction_runs: copy(&self.eviction_runs),
            bytes_evicted_total: copy(&self.bytes_evicted_total),
        }
    }

    fn reset(&self) {
        for v in [
            &self.hits,
            &self.misses,
            &self.evictions,
            &self.expired,
            &self.size_bytes,
            &self.entry_count,
            &self.eviction_runs,
            &self.bytes_evicted_total,
        ] {
            v.store(0, Ordering::Relaxed);
        }
    }
}

/// Bounded in-memory poster cache.
pub struct MemoryCache {
    cache: RwLock<LruCache<CacheKey, CacheEntry>>,
    max_bytes: u64,
    ttl: Duration,
    stats: MemoryCacheStats,
}

impl MemoryCache {
    /// Create a cache holding at most `max_entries` posters and `max_bytes`
    /// of pixels. A zero entry limit is treated as one.
    pub fn new(max_entries: usize, max_bytes: u64, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: RwLock::new(LruCache::new(capacity)),
            max_bytes,
            ttl,
            stats: MemoryCacheStats::default(),
        }
    }

    /// Look up a poster, dropping it if its TTL has elapsed.
    pub async fn get(&self, key: &CacheKey) -> Option<PosterImage> {
        let mut cache = self.cache.write().await;

        let expired = match cache.get(key) {
            Some(entry) if !entry.is_expired(self.ttl) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.image.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            if let Some(entry) = cache.pop(key) {
                self.stats.expired.fetch_add(1, Ordering::Relaxed);
                self.stats
                    .size_bytes
                    .fetch_sub(entry.byte_size as u64, Ordering::Relaxed);
                self.stats.entry_count.fetch_sub(1, Ordering::Relaxed);
                debug!(key = %key, "Memory cache entry expired");
            }
        }
        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Whether a live entry exists, without touching recency or counters.
    pub async fn contains(&self, key: &CacheKey) -> bool {
        let cache = self.cache.read().await;
        cache
            .peek(key)
            .map(|entry| !entry.is_expired(self.ttl))
            .unwrap_or(false)
    }

    /// Insert a poster. Returns `false` when the poster alone exceeds the
    /// byte ceiling and was not cached.
    pub async fn insert(&self, key: CacheKey, image: PosterImage) -> bool {
        let entry = CacheEntry::new(image);
        let size = entry.byte_size as u64;
        if size > self.max_bytes {
            debug!(key = %key, size_bytes = size, max_bytes = self.max_bytes, "Poster too large for memory cache");
            return false;
        }

        let mut cache = self.cache.write().await;

        if let Some(existing) = cache.pop(&key) {
            self.stats
                .size_bytes
                .fetch_sub(existing.byte_size as u64, Ordering::Relaxed);
            self.stats.entry_count.fetch_sub(1, Ordering::Relaxed);
        }

        let current = self.stats.size_bytes.load(Ordering::Relaxed);
        if current + size > self.max_bytes {
            let needed = current + size - self.max_bytes;
            self.evict_bytes_locked(&mut cache, needed.max(self.max_bytes / 20));
        }

        // At the count ceiling the LRU hands back its oldest entry.
        if let Some((_, evicted)) = cache.push(key, entry) {
            self.record_evictions(1, evicted.byte_size as u64);
            info!(
                entries_evicted = 1,
                bytes_freed_mb = format!("{:.2}", evicted.byte_size as f64 / (1024.0 * 1024.0)),
                trigger = "entry_limit",
                "Memory cache eviction completed"
            );
        }
        self.stats.size_bytes.fetch_add(size, Ordering::Relaxed);
        self.stats.entry_count.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Remove one entry. Returns whether it was present.
    pub async fn remove(&self, key: &CacheKey) -> bool {
        let mut cache = self.cache.write().await;
        match cache.pop(key) {
            Some(entry) => {
                self.stats
                    .size_bytes
                    .fetch_sub(entry.byte_size as u64, Ordering::Relaxed);
                self.stats.entry_count.fetch_sub(1, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    fn record_evictions(&self, entries: usize, bytes: u64) {
        self.stats.size_bytes.fetch_sub(bytes, Ordering::Relaxed);
        self.stats
            .entry_count
            .fetch_sub(entries as u64, Ordering::Relaxed);
        self.stats
            .evictions
            .fetch_add(entries as u64, Ordering::Relaxed);
        self.stats.eviction_runs.fetch_add(1, Ordering::Relaxed);
        self.stats
            .bytes_evicted_total
            .fetch_add(bytes, Ordering::Relaxed);
        metrics::counter!("poster_cache_evictions_total").increment(entries as u64);
    }

    /// Evict LRU entries until at least `target_free` bytes are released.
    fn evict_bytes_locked(
        &self,
        cache: &mut LruCache<CacheKey, CacheEntry>,
        target_free: u64,
    ) -> (usize, u64) {
        let mut bytes_freed = 0u64;
        let mut entries_evicted = 0usize;

        while bytes_freed < target_free {
            match cache.pop_lru() {
                Some((_, evicted)) => {
                    bytes_freed += evicted.byte_size as u64;
                    entries_evicted += 1;
                }
                None => break,
            }
        }

        if entries_evicted > 0 {
            self.record_evictions(entries_evicted, bytes_freed);
            info!(
                entries_evicted = entries_evicted,
                bytes_freed_mb = format!("{:.2}", bytes_freed as f64 / (1024.0 * 1024.0)),
                cache_size_mb = format!("{:.2}", self.size_bytes() as f64 / (1024.0 * 1024.0)),
                max_size_mb = format!("{:.2}", self.max_bytes as f64 / (1024.0 * 1024.0)),
                trigger = "byte_limit",
                "Memory cache batch eviction completed"
            );
        }
        (entries_evicted, bytes_freed)
    }

    /// Evict a fraction (0.0 to 1.0) of entries in LRU order, e.g. under
    /// memory pressure. Returns the number evicted.
    pub async fn evict_percentage(&self, percentage: f64) -> usize {
        let mut cache = self.cache.write().await;
        let to_evict = (cache.len() as f64 * percentage.clamp(0.0, 1.0)) as usize;
        let mut bytes_freed = 0u64;
        let mut evicted = 0usize;

        for _ in 0..to_evict {
            match cache.pop_lru() {
                Some((_, entry)) => {
                    bytes_freed += entry.byte_size as u64;
                    evicted += 1;
                }
                None => break,
            }
        }

        if evicted > 0 {
            self.record_evictions(evicted, bytes_freed);
            info!(
                entries_evicted = evicted,
                bytes_freed_mb = format!("{:.2}", bytes_freed as f64 / (1024.0 * 1024.0)),
                trigger = "memory_pressure",
                "Memory cache eviction completed"
            );
        }
        evicted
    }

    /// Drop every entry and reset counters.
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.clear();
        self.stats.reset();
    }

    /// Point-in-time copy of the counters.
    pub fn stats(&self) -> MemoryCacheStats {
        self.stats.snapshot()
    }

    pub fn len(&self) -> usize {
        self.stats.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn size_bytes(&self) -> u64 {
        self.stats.size_bytes()
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Byte utilization (0.0 - 1.0).
    pub fn utilization(&self) -> f64 {
        if self.max_bytes == 0 {
            0.0
        } else {
            self.size_bytes() as f64 / self.max_bytes as f64
        }
    }
}

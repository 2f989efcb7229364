//! Two-tier artifact cache with single-flight rendering.
//!
//! Lookup order is memory, then disk, then the producer. A miss on both
//! tiers is rendered once per key even under concurrent requests: callers
//! for the same key queue on a per-key slot, and the caller that renders
//! publishes its image into the slot before releasing it. Waiters take the
//! published image directly, so coalescing holds even for posters neither
//! tier will store (larger than the memory ceiling, no disk tier).
//! Successful renders are written through to both tiers; failed or
//! cancelled renders are never cached or shared, and the next waiter
//! renders instead.

use poster_common::{PosterError, PosterImage, PosterResult};
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex, Weak};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::disk::DiskCache;
use crate::key::CacheKey;
use crate::memory::MemoryCache;

/// Default memory-tier entry ceiling.
pub const DEFAULT_MAX_ENTRIES: usize = 50;
/// Default memory-tier byte ceiling (100 MB).
pub const DEFAULT_MAX_BYTES: u64 = 100 * 1024 * 1024;
/// Default memory-tier TTL.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);
/// Default disk-tier TTL.
pub const DEFAULT_DISK_TTL: Duration = Duration::from_secs(7 * 24 * 3600);

/// Cache limits and locations.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    pub max_entries: usize,
    pub max_bytes: u64,
    pub ttl: Duration,
    /// Disk tier directory; `None` keeps the cache memory-only.
    pub disk_dir: Option<PathBuf>,
    pub disk_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_bytes: DEFAULT_MAX_BYTES,
            ttl: DEFAULT_TTL,
            disk_dir: None,
            disk_ttl: DEFAULT_DISK_TTL,
        }
    }
}

/// Where a `get_or_render` result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
    Memory,
    Disk,
    Rendered,
    /// Rendered by a concurrent caller for the same key.
    Coalesced,
}

impl CacheSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheSource::Memory => "memory",
            CacheSource::Disk => "disk",
            CacheSource::Rendered => "rendered",
            CacheSource::Coalesced => "coalesced",
        }
    }
}

/// Per-key render slot. Holding the lock grants the right to render; the
/// value is the image published by the last successful holder.
type Flight = Mutex<Option<PosterImage>>;

/// Memory tier, optional disk tier and per-key render slots.
pub struct ArtifactCache {
    memory: MemoryCache,
    disk: Option<DiskCache>,
    inflight: StdMutex<HashMap<CacheKey, Weak<Flight>>>,
}

impl ArtifactCache {
    pub fn new(memory: MemoryCache, disk: Option<DiskCache>) -> Self {
        Self {
            memory,
            disk,
            inflight: StdMutex::new(HashMap::new()),
        }
    }

    /// Build both tiers from `config`. A disk directory that cannot be
    /// created degrades to memory-only caching.
    pub async fn from_config(config: &CacheConfig) -> Self {
        let memory = MemoryCache::new(config.max_entries, config.max_bytes, config.ttl);
        let disk = match &config.disk_dir {
            Some(dir) => match DiskCache::open(dir.clone(), config.disk_ttl).await {
                Ok(disk) => Some(disk),
                Err(e) => {
                    warn!(error = %e, "Disk cache unavailable, caching in memory only");
                    None
                }
            },
            None => None,
        };
        Self::new(memory, disk)
    }

    pub fn memory(&self) -> &MemoryCache {
        &self.memory
    }

    pub fn disk(&self) -> Option<&DiskCache> {
        self.disk.as_ref()
    }

    /// Return the cached poster for `key`, or render it with `produce`.
    pub async fn get_or_render<F, Fut>(&self, key: CacheKey, produce: F) -> PosterResult<PosterImage>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = PosterResult<PosterImage>>,
    {
        self.get_or_render_traced(key, produce)
            .await
            .map(|(image, _)| image)
    }

    /// As [`get_or_render`](Self::get_or_render), also reporting which tier
    /// served the request.
    pub async fn get_or_render_traced<F, Fut>(
        &self,
        key: CacheKey,
        produce: F,
    ) -> PosterResult<(PosterImage, CacheSource)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = PosterResult<PosterImage>>,
    {
        self.get_or_render_until(key, std::future::pending::<()>(), produce)
            .await
    }

    /// As [`get_or_render_traced`](Self::get_or_render_traced), but gives up
    /// with [`PosterError::Cancelled`] if `cancelled` completes while the
    /// caller is still queued behind another render of the same key. Once
    /// `produce` has started it runs to completion; it is expected to watch
    /// the same signal itself.
    pub async fn get_or_render_until<C, F, Fut>(
        &self,
        key: CacheKey,
        cancelled: C,
        produce: F,
    ) -> PosterResult<(PosterImage, CacheSource)>
    where
        C: Future<Output = ()>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = PosterResult<PosterImage>>,
    {
        if let Some(image) = self.memory.get(&key).await {
            return Ok(self.served(key, image, CacheSource::Memory));
        }

        let flight = self.key_lock(key);
        let result = {
            let slot = tokio::select! {
                biased;
                _ = cancelled => None,
                slot = flight.lock() => Some(slot),
            };
            match slot {
                None => {
                    debug!(key = %key, "Gave up waiting for in-flight render");
                    Err(PosterError::Cancelled)
                }
                Some(mut slot) => match slot.as_ref() {
                    Some(image) => Ok(self.served(key, image.clone(), CacheSource::Coalesced)),
                    None => {
                        let result = self.lookup_or_produce(key, produce).await;
                        if let Ok((image, _)) = &result {
                            *slot = Some(image.clone());
                        }
                        result
                    }
                },
            }
        };
        drop(flight);
        self.prune_locks();
        result
    }

    async fn lookup_or_produce<F, Fut>(
        &self,
        key: CacheKey,
        produce: F,
    ) -> PosterResult<(PosterImage, CacheSource)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = PosterResult<PosterImage>>,
    {
        // Another caller may have filled a tier while we waited.
        if let Some(image) = self.memory.get(&key).await {
            return Ok(self.served(key, image, CacheSource::Memory));
        }

        if let Some(image) = self.disk_get(&key).await {
            self.memory.insert(key, image.clone()).await;
            return Ok(self.served(key, image, CacheSource::Disk));
        }

        let start = Instant::now();
        let image = produce().await?;
        metrics::histogram!("poster_render_duration_ms").record(start.elapsed().as_secs_f64() * 1000.0);

        self.memory.insert(key, image.clone()).await;
        if let Some(disk) = &self.disk {
            if let Err(e) = disk.put(&key, &image).await {
                warn!(key = %key, error = %e, "Disk cache write failed, keeping memory copy only");
            }
        }
        Ok(self.served(key, image, CacheSource::Rendered))
    }

    fn served(&self, key: CacheKey, image: PosterImage, source: CacheSource) -> (PosterImage, CacheSource) {
        debug!(key = %key, source = source.as_str(), "Poster served");
        match source {
            CacheSource::Rendered => metrics::counter!("poster_cache_misses_total").increment(1),
            _ => metrics::counter!("poster_cache_hits_total", "tier" => source.as_str()).increment(1),
        }
        (image, source)
    }

    async fn disk_get(&self, key: &CacheKey) -> Option<PosterImage> {
        let disk = self.disk.as_ref()?;
        match disk.get(key).await {
            Ok(image) => image,
            Err(e) => {
                warn!(key = %key, error = %e, "Disk cache read failed, treating as miss");
                None
            }
        }
    }

    /// Look up without rendering.
    pub async fn get(&self, key: &CacheKey) -> Option<PosterImage> {
        if let Some(image) = self.memory.get(key).await {
            return Some(image);
        }
        let image = self.disk_get(key).await?;
        self.memory.insert(*key, image.clone()).await;
        Some(image)
    }

    /// Store a poster in both tiers.
    pub async fn insert(&self, key: CacheKey, image: PosterImage) -> PosterResult<()> {
        self.memory.insert(key, image.clone()).await;
        if let Some(disk) = &self.disk {
            disk.put(&key, &image).await?;
        }
        Ok(())
    }

    /// Remove a key from both tiers.
    pub async fn invalidate(&self, key: &CacheKey) -> PosterResult<()> {
        self.memory.remove(key).await;
        if let Some(disk) = &self.disk {
            disk.remove(key).await?;
        }
        Ok(())
    }

    /// Number of keys with a render in progress or queued.
    pub fn inflight_keys(&self) -> usize {
        self.inflight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    fn key_lock(&self, key: CacheKey) -> Arc<Flight> {
        let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = inflight.get(&key).and_then(Weak::upgrade) {
            return existing;
        }
        let lock = Arc::new(Mutex::new(None));
        inflight.insert(key, Arc::downgrade(&lock));
        lock
    }

    fn prune_locks(&self) {
        let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        inflight.retain(|_, lock| lock.strong_count() > 0);
    }
}

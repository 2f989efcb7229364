//! Integration tests for the two-tier artifact cache.

use poster_common::{PosterError, PosterImage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use storage::{ArtifactCache, CacheConfig, CacheKey, CacheSource, DiskCache, MemoryCache};
use test_utils::temp_cache_dir;

fn poster(shade: u8) -> PosterImage {
    PosterImage::filled(32, 48, [shade, shade, 200, 255])
}

async fn two_tier(dir: &std::path::Path) -> ArtifactCache {
    ArtifactCache::from_config(&CacheConfig {
        disk_dir: Some(dir.to_path_buf()),
        ..CacheConfig::default()
    })
    .await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_render_once() {
    let cache = Arc::new(ArtifactCache::new(
        MemoryCache::new(10, 10 * 1024 * 1024, Duration::from_secs(60)),
        None,
    ));
    let renders = Arc::new(AtomicUsize::new(0));
    let key = CacheKey::from_u128(0xabc);

    let mut handles = Vec::new();
    for _ in 0..16 {
        let cache = Arc::clone(&cache);
        let renders = Arc::clone(&renders);
        handles.push(tokio::spawn(async move {
            cache
                .get_or_render(key, || async move {
                    renders.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(poster(10))
                })
                .await
        }));
    }

    for handle in handles {
        let image = handle.await.unwrap().unwrap();
        assert_eq!(image, poster(10));
    }
    assert_eq!(renders.load(Ordering::SeqCst), 1);
    assert_eq!(cache.inflight_keys(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_render_once_when_too_large_to_cache() {
    // 32x48 RGBA is 6,144 bytes: over the memory ceiling, and no disk tier.
    let cache = Arc::new(ArtifactCache::new(
        MemoryCache::new(10, 4096, Duration::from_secs(60)),
        None,
    ));
    let renders = Arc::new(AtomicUsize::new(0));
    let key = CacheKey::from_u128(0xb16);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let cache = Arc::clone(&cache);
        let renders = Arc::clone(&renders);
        handles.push(tokio::spawn(async move {
            cache
                .get_or_render_traced(key, || async move {
                    renders.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    Ok(poster(20))
                })
                .await
        }));
    }

    let mut sources = Vec::new();
    for handle in handles {
        let (image, source) = handle.await.unwrap().unwrap();
        assert_eq!(image, poster(20));
        sources.push(source);
    }
    assert_eq!(renders.load(Ordering::SeqCst), 1);
    assert!(cache.memory().is_empty());
    assert_eq!(sources.iter().filter(|s| **s == CacheSource::Rendered).count(), 1);
    assert_eq!(sources.iter().filter(|s| **s == CacheSource::Coalesced).count(), 7);
    assert_eq!(cache.inflight_keys(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failed_render_is_retried_by_next_waiter() {
    let cache = Arc::new(ArtifactCache::new(
        MemoryCache::new(10, 10 * 1024 * 1024, Duration::from_secs(60)),
        None,
    ));
    let renders = Arc::new(AtomicUsize::new(0));
    let key = CacheKey::from_u128(0xfa11);

    let mut handles = Vec::new();
    for _ in 0..2 {
        let cache = Arc::clone(&cache);
        let renders = Arc::clone(&renders);
        handles.push(tokio::spawn(async move {
            cache
                .get_or_render(key, || async move {
                    let attempt = renders.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    if attempt == 0 {
                        Err(PosterError::Render("first attempt fails".into()))
                    } else {
                        Ok(poster(30))
                    }
                })
                .await
        }));
    }

    let mut ok = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            ok += 1;
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(renders.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_distinct_keys_render_independently() {
    let cache = Arc::new(ArtifactCache::new(
        MemoryCache::new(10, 10 * 1024 * 1024, Duration::from_secs(60)),
        None,
    ));
    let renders = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for i in 0..4u8 {
        let cache = Arc::clone(&cache);
        let renders = Arc::clone(&renders);
        handles.push(tokio::spawn(async move {
            cache
                .get_or_render(CacheKey::from_u128(i as u128), || async move {
                    renders.fetch_add(1, Ordering::SeqCst);
                    Ok(poster(i))
                })
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(renders.load(Ordering::SeqCst), 4);
    assert_eq!(cache.memory().len(), 4);
}

#[tokio::test]
async fn test_disk_hit_promotes_to_memory() {
    let dir = temp_cache_dir();
    let cache = two_tier(dir.path()).await;
    let key = CacheKey::from_u128(77);

    let (_, source) = cache
        .get_or_render_traced(key, || async { Ok(poster(1)) })
        .await
        .unwrap();
    assert_eq!(source, CacheSource::Rendered);
    assert!(cache.disk().unwrap().path_for(&key).exists());

    cache.memory().clear().await;
    let (image, source) = cache
        .get_or_render_traced(key, || async { Err(PosterError::Render("should not run".into())) })
        .await
        .unwrap();
    assert_eq!(source, CacheSource::Disk);
    assert_eq!(image, poster(1));
    assert!(cache.memory().contains(&key).await);
}

#[tokio::test]
async fn test_survives_restart() {
    let dir = temp_cache_dir();
    let key = CacheKey::from_u128(5);
    {
        let cache = two_tier(dir.path()).await;
        cache.get_or_render(key, || async { Ok(poster(3)) }).await.unwrap();
    }

    let cache = two_tier(dir.path()).await;
    assert_eq!(cache.get(&key).await, Some(poster(3)));
}

#[tokio::test]
async fn test_failed_render_is_not_cached() {
    let dir = temp_cache_dir();
    let cache = two_tier(dir.path()).await;
    let key = CacheKey::from_u128(6);

    let result = cache
        .get_or_render(key, || async { Err(PosterError::Render("boom".into())) })
        .await;
    assert!(matches!(result, Err(PosterError::Render(_))));
    assert!(cache.memory().is_empty());
    assert_eq!(cache.disk().unwrap().len().await.unwrap(), 0);
}

#[tokio::test]
async fn test_cancelled_render_releases_key() {
    let cache = ArtifactCache::new(
        MemoryCache::new(10, 10 * 1024 * 1024, Duration::from_secs(60)),
        None,
    );
    let key = CacheKey::from_u128(8);

    let pending = cache.get_or_render(key, || async {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(poster(0))
    });
    assert!(tokio::time::timeout(Duration::from_millis(20), pending)
        .await
        .is_err());
    assert!(cache.get(&key).await.is_none());

    let image = cache.get_or_render(key, || async { Ok(poster(4)) }).await.unwrap();
    assert_eq!(image, poster(4));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_queued_caller_can_give_up() {
    let cache = Arc::new(ArtifactCache::new(
        MemoryCache::new(10, 10 * 1024 * 1024, Duration::from_secs(60)),
        None,
    ));
    let key = CacheKey::from_u128(0x9a17);

    let leader = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            cache
                .get_or_render(key, || async {
                    tokio::time::sleep(Duration::from_millis(300)).await;
                    Ok(poster(6))
                })
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let started = std::time::Instant::now();
    let waiter = cache
        .get_or_render_until(key, tokio::time::sleep(Duration::from_millis(20)), || async {
            Ok(poster(7))
        })
        .await;
    assert!(matches!(waiter, Err(PosterError::Cancelled)));
    assert!(started.elapsed() < Duration::from_millis(250));

    assert_eq!(leader.await.unwrap().unwrap(), poster(6));
    assert_eq!(cache.get(&key).await, Some(poster(6)));
}

#[tokio::test]
async fn test_unwritable_disk_degrades_to_memory() {
    let dir = temp_cache_dir();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();

    let cache = ArtifactCache::from_config(&CacheConfig {
        disk_dir: Some(blocker.join("cache")),
        ..CacheConfig::default()
    })
    .await;
    assert!(cache.disk().is_none());

    let key = CacheKey::from_u128(9);
    cache.get_or_render(key, || async { Ok(poster(2)) }).await.unwrap();
    assert!(cache.memory().contains(&key).await);
}

#[tokio::test]
async fn test_invalidate_clears_both_tiers() {
    let dir = temp_cache_dir();
    let cache = two_tier(dir.path()).await;
    let key = CacheKey::from_u128(10);
    cache.insert(key, poster(5)).await.unwrap();

    cache.invalidate(&key).await.unwrap();
    assert!(!cache.memory().contains(&key).await);
    assert!(!cache.disk().unwrap().path_for(&key).exists());

    let disk = DiskCache::open(dir.path(), Duration::from_secs(60)).await.unwrap();
    assert!(disk.get(&key).await.unwrap().is_none());
}

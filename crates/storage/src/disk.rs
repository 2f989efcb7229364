//! Persistent PNG tier.
//!
//! Entries live at `{dir}/{fingerprint}.png`. Writes go to a uniquely named
//! temporary file in the same directory and are published with a rename, so
//! readers never see a partial file. There is no index: files may be deleted
//! externally at any time and are simply re-rendered.

use poster_common::{PosterError, PosterImage, PosterResult};
use renderer::{decode_png, encode_png};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

use crate::key::CacheKey;

const EXTENSION: &str = "png";
const TEMP_SUFFIX: &str = "tmp";

/// On-disk poster cache.
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
    ttl: Duration,
}

impl DiskCache {
    /// Open (creating if needed) a cache directory.
    pub async fn open(dir: impl Into<PathBuf>, ttl: Duration) -> PosterResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            PosterError::Io(format!("cannot create cache dir {}: {}", dir.display(), e))
        })?;
        info!(dir = %dir.display(), ttl_secs = ttl.as_secs(), "Disk cache ready");
        Ok(Self { dir, ttl })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an entry is stored under.
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{}.{}", key, EXTENSION))
    }

    fn is_expired(&self, modified: SystemTime) -> bool {
        // A clock step backwards leaves the entry live.
        SystemTime::now()
            .duration_since(modified)
            .map(|age| age > self.ttl)
            .unwrap_or(false)
    }

    /// Read an entry. Missing, expired and undecodable files are all misses;
    /// expired and corrupt files are deleted.
    pub async fn get(&self, key: &CacheKey) -> PosterResult<Option<PosterImage>> {
        let path = self.path_for(key);

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if metadata.modified().map(|m| self.is_expired(m)).unwrap_or(false) {
            debug!(key = %key, "Disk cache entry expired");
            remove_if_exists(&path).await?;
            return Ok(None);
        }

        let data = match tokio::fs::read(&path).await {
            Ok(d) => d,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let decoded = tokio::task::spawn_blocking(move || decode_png(&data))
            .await
            .map_err(|e| PosterError::Cache(format!("decode task failed: {}", e)))?;
        match decoded {
            Ok(image) => Ok(Some(image)),
            Err(e) => {
                warn!(key = %key, error = %e, "Corrupt disk cache entry, removing");
                remove_if_exists(&path).await?;
                Ok(None)
            }
        }
    }

    /// Encode and atomically publish an entry, replacing any existing one.
    pub async fn put(&self, key: &CacheKey, image: &PosterImage) -> PosterResult<()> {
        let image = image.clone();
        let png = tokio::task::spawn_blocking(move || encode_png(&image))
            .await
            .map_err(|e| PosterError::Cache(format!("encode task failed: {}", e)))??;

        let final_path = self.path_for(key);
        let temp_path = self
            .dir
            .join(format!(".{}.{}.{}", key, uuid::Uuid::new_v4(), TEMP_SUFFIX));

        if let Err(e) = tokio::fs::write(&temp_path, &png).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&temp_path, &final_path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        debug!(key = %key, bytes = png.len(), "Wrote disk cache entry");
        Ok(())
    }

    /// Delete one entry. Returns whether a file was removed.
    pub async fn remove(&self, key: &CacheKey) -> PosterResult<bool> {
        remove_if_exists(&self.path_for(key)).await
    }

    /// Delete every entry file (and stray temporaries). Returns the count of
    /// entries removed.
    pub async fn clear(&self) -> PosterResult<usize> {
        self.sweep(|_| true).await
    }

    /// Delete entries whose modification time is older than the TTL.
    pub async fn purge_expired(&self) -> PosterResult<usize> {
        let removed = self.sweep(|modified| self.is_expired(modified)).await?;
        if removed > 0 {
            info!(entries_removed = removed, "Purged expired disk cache entries");
        }
        Ok(removed)
    }

    /// Number of entry files currently present.
    pub async fn len(&self) -> PosterResult<usize> {
        let mut count = 0;
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if is_entry_file(&entry.path()) {
                count += 1;
            }
        }
        Ok(count)
    }

    async fn sweep(&self, should_remove: impl Fn(SystemTime) -> bool) -> PosterResult<usize> {
        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_entry = is_entry_file(&path);
            if !is_entry && !is_temp_file(&path) {
                continue;
            }
            let modified = match entry.metadata().await.and_then(|m| m.modified()) {
                Ok(m) => m,
                Err(_) => continue,
            };
            if should_remove(modified) && remove_if_exists(&path).await? && is_entry {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

fn is_entry_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(EXTENSION)
        && path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.parse::<CacheKey>().is_ok())
            .unwrap_or(false)
}

fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    name.starts_with('.') && path.extension().and_then(|e| e.to_str()) == Some(TEMP_SUFFIX)
}

async fn remove_if_exists(path: &Path) -> PosterResult<bool> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

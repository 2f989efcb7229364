//! Basemap collaborators.
//!
//! A provider turns a geographic window and a pixel size into map imagery.
//! The pipeline never retries: an error, a timeout or `None` all mean the
//! poster is drawn on the flat background instead.

use async_trait::async_trait;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use poster_common::{PosterError, PosterImage, PosterResult};
use projection::GeoRegion;
use std::path::Path;
use storage::KeyHasher;
use tracing::{debug, info};

/// Source of map imagery behind the route.
#[async_trait]
pub trait BasemapProvider: Send + Sync {
    /// Imagery covering `region` at `size` pixels, or `None` when the
    /// provider has nothing for it.
    async fn fetch(&self, region: &GeoRegion, size: (u32, u32)) -> PosterResult<Option<PosterImage>>;

    /// Identifies the imagery in cache keys. Two providers that could return
    /// different pixels for the same request must return different tags.
    fn cache_tag(&self) -> String;
}

/// Provider that never has imagery.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBasemap;

#[async_trait]
impl BasemapProvider for NoBasemap {
    async fn fetch(&self, _region: &GeoRegion, _size: (u32, u32)) -> PosterResult<Option<PosterImage>> {
        Ok(None)
    }

    fn cache_tag(&self) -> String {
        "none".to_string()
    }
}

/// A single pre-rendered raster served for every region.
#[derive(Debug, Clone)]
pub struct StaticBasemap {
    image: PosterImage,
    tag: String,
}

impl StaticBasemap {
    pub fn new(image: PosterImage, tag: impl Into<String>) -> Self {
        Self {
            image,
            tag: tag.into(),
        }
    }

    /// Load any raster format the `image` crate understands. The cache tag is
    /// derived from the file contents.
    pub async fn from_file(path: impl AsRef<Path>) -> PosterResult<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await.map_err(|e| {
            PosterError::Basemap(format!("cannot read {}: {}", path.display(), e))
        })?;

        let mut hasher = KeyHasher::new();
        hasher.write_bytes(&data);
        let tag = format!("static:{}", hasher.finish());

        let image = tokio::task::spawn_blocking(move || -> PosterResult<PosterImage> {
            let decoded = image::load_from_memory(&data)
                .map_err(|e| PosterError::Basemap(format!("cannot decode basemap: {}", e)))?
                .to_rgba8();
            let (width, height) = decoded.dimensions();
            PosterImage::new(width, height, decoded.into_raw())
        })
        .await
        .map_err(|e| PosterError::Basemap(format!("decode task failed: {}", e)))??;

        info!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "Loaded static basemap"
        );
        Ok(Self { image, tag })
    }

    pub fn image(&self) -> &PosterImage {
        &self.image
    }
}

#[async_trait]
impl BasemapProvider for StaticBasemap {
    async fn fetch(&self, _region: &GeoRegion, size: (u32, u32)) -> PosterResult<Option<PosterImage>> {
        let (width, height) = size;
        if (self.image.width(), self.image.height()) == size {
            return Ok(Some(self.image.clone()));
        }
        if width == 0 || height == 0 {
            return Ok(None);
        }

        debug!(width, height, "Resizing static basemap");
        let source = self.image.clone();
        let resized = tokio::task::spawn_blocking(move || -> PosterResult<PosterImage> {
            let raw = RgbaImage::from_raw(source.width(), source.height(), source.pixels().to_vec())
                .ok_or_else(|| PosterError::Basemap("basemap buffer does not match its size".to_string()))?;
            let out = imageops::resize(&raw, width, height, FilterType::Triangle);
            PosterImage::new(width, height, out.into_raw())
        })
        .await
        .map_err(|e| PosterError::Basemap(format!("resize task failed: {}", e)))??;
        Ok(Some(resized))
    }

    fn cache_tag(&self) -> String {
        self.tag.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poster_common::GeoPoint;

    fn region() -> GeoRegion {
        GeoRegion::from_corners(GeoPoint::new(1.0, 1.0), GeoPoint::new(2.0, 2.0))
    }

    #[tokio::test]
    async fn test_no_basemap() {
        assert!(NoBasemap.fetch(&region(), (10, 10)).await.unwrap().is_none());
        assert_eq!(NoBasemap.cache_tag(), "none");
    }

    #[tokio::test]
    async fn test_static_resizes_to_request() {
        let provider = StaticBasemap::new(PosterImage::filled(8, 8, [10, 20, 30, 255]), "test");
        let image = provider.fetch(&region(), (20, 12)).await.unwrap().unwrap();
        assert_eq!((image.width(), image.height()), (20, 12));
        assert_eq!(image.pixel(10, 6), Some([10, 20, 30, 255]));
    }

    #[tokio::test]
    async fn test_from_file_tags_by_content() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        std::fs::write(&a, renderer::encode_png(&PosterImage::filled(4, 4, [1, 1, 1, 255])).unwrap()).unwrap();
        std::fs::write(&b, renderer::encode_png(&PosterImage::filled(4, 4, [2, 2, 2, 255])).unwrap()).unwrap();

        let first = StaticBasemap::from_file(&a).await.unwrap();
        let again = StaticBasemap::from_file(&a).await.unwrap();
        let other = StaticBasemap::from_file(&b).await.unwrap();
        assert_eq!(first.cache_tag(), again.cache_tag());
        assert_ne!(first.cache_tag(), other.cache_tag());
        assert_eq!(first.image().pixel(0, 0), Some([1, 1, 1, 255]));
    }

    #[tokio::test]
    async fn test_missing_file_is_basemap_error() {
        let err = StaticBasemap::from_file("/nonexistent/basemap.png").await.unwrap_err();
        assert!(matches!(err, PosterError::Basemap(_)));
    }
}

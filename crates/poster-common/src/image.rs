//! The rendered artifact.

use bytes::Bytes;

use crate::error::{PosterError, PosterResult};

/// Bytes per pixel of [`PosterImage`] (RGBA8).
pub const BYTES_PER_PIXEL: usize = 4;

/// An immutable RGBA image.
///
/// Pixel format: straight (non-premultiplied) RGBA, 8 bits per channel,
/// row-major with no row padding. Cloning is cheap; the pixel buffer is
/// shared and never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterImage {
    width: u32,
    height: u32,
    pixels: Bytes,
}

impl PosterImage {
    /// Wrap a pixel buffer, checking that its length matches the dimensions.
    pub fn new(width: u32, height: u32, pixels: impl Into<Bytes>) -> PosterResult<Self> {
        let pixels = pixels.into();
        let expected = Self::estimate_size(width, height);
        if pixels.len() != expected {
            return Err(PosterError::Render(format!(
                "pixel buffer is {} bytes, expected {} for {}x{}",
                pixels.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A uniformly filled image.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * BYTES_PER_PIXEL);
        for _ in 0..count {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            pixels: Bytes::from(pixels),
        }
    }

    /// Memory estimate for an image of the given size: `width * height * 4`.
    pub fn estimate_size(width: u32, height: u32) -> usize {
        width as usize * height as usize * BYTES_PER_PIXEL
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Shared handle to the pixel buffer.
    pub fn bytes(&self) -> Bytes {
        self.pixels.clone()
    }

    /// Size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// RGBA value at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let px = &self.pixels[offset..offset + BYTES_PER_PIXEL];
        Some([px[0], px[1], px[2], px[3]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_length() {
        assert!(PosterImage::new(2, 2, vec![0u8; 16]).is_ok());
        assert!(PosterImage::new(2, 2, vec![0u8; 15]).is_err());
    }

    #[test]
    fn test_filled_and_pixel_access() {
        let img = PosterImage::filled(3, 2, [10, 20, 30, 255]);
        assert_eq!(img.byte_size(), 3 * 2 * 4);
        assert_eq!(img.pixel(2, 1), Some([10, 20, 30, 255]));
        assert_eq!(img.pixel(3, 0), None);
    }
}

//! Decoded pixel buffers shared between the scene and the renderer.

use std::fmt;
use std::sync::Arc;

use crate::error::{SceneError, SceneResult};

/// An RGBA8 image with straight alpha, 4 bytes per pixel, row-major.
///
/// Pixel data is reference-counted so cloning a scene object never copies the
/// buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    data: Arc<Vec<u8>>,
}

impl RasterImage {
    /// Wrap an RGBA buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer length does not match `width * height * 4`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> SceneResult<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if data.len() != expected {
            return Err(SceneError::InvalidValue(format!(
                "raster of {width}x{height} needs {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data: Arc::new(data),
        })
    }

    /// A fully transparent image.
    #[must_use]
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: Arc::new(vec![0; (width as usize) * (height as usize) * 4]),
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Take the bytes out, copying only if the buffer is shared.
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        Arc::try_unwrap(self.data).unwrap_or_else(|shared| (*shared).clone())
    }

    /// RGBA of one pixel, or `None` when out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }
}

impl Default for RasterImage {
    fn default() -> Self {
        Self::transparent(0, 0)
    }
}

impl fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

//! Raw pixel buffers
//!
//! `PixelBuffer` is the only image type the engine understands. Decoding and
//! encoding image files happens outside the core; everything here is straight
//! (non-premultiplied) RGBA8.

use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Size;

/// Errors produced when constructing pixel buffers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PixelError {
    /// The byte count does not match `width * height * 4`
    #[error("invalid pixel data length: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Base64 payload could not be decoded
    #[error("invalid base64 pixel data: {0}")]
    Encoding(String),
}

/// Decoded RGBA image data
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "PixelRecord", into = "PixelRecord")]
pub struct PixelBuffer {
    /// Raw RGBA pixel data, row-major, top row first
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// The "nothing to render" sentinel
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a buffer from raw RGBA pixels
    pub fn from_rgba(pixels: Vec<u8>, width: u32, height: u32) -> Result<Self, PixelError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(PixelError::LengthMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// A buffer where every pixel has the same RGBA value
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * 4);
        for _ in 0..count {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            pixels,
            width,
            height,
        }
    }

    /// True for the 0×0 sentinel (or any buffer without pixels)
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Natural size in points (one point per pixel)
    pub fn size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }

    /// Get the pixel data as a slice
    pub fn data(&self) -> &[u8] {
        &self.pixels
    }

    /// Take ownership of the pixel data
    pub fn into_data(self) -> Vec<u8> {
        self.pixels
    }

    /// RGBA value at (x, y), or `None` outside the buffer
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Whether any pixel has non-zero alpha
    pub fn has_visible_pixels(&self) -> bool {
        self.pixels.chunks_exact(4).any(|px| px[3] != 0)
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// Persisted form of a pixel buffer: base64 RGBA plus dimensions
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PixelRecord {
    pub data: String,
    pub width: u32,
    pub height: u32,
}

impl From<PixelBuffer> for PixelRecord {
    fn from(buffer: PixelBuffer) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(&buffer.pixels),
            width: buffer.width,
            height: buffer.height,
        }
    }
}

impl TryFrom<PixelRecord> for PixelBuffer {
    type Error = PixelError;

    fn try_from(record: PixelRecord) -> Result<Self, Self::Error> {
        let pixels = base64::engine::general_purpose::STANDARD
            .decode(record.data.as_bytes())
            .map_err(|e| PixelError::Encoding(e.to_string()))?;
        PixelBuffer::from_rgba(pixels, record.width, record.height)
    }
}

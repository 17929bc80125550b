//! Offscreen drawing surfaces
//!
//! A [`Surface`] owns one premultiplied tiny-skia pixmap. It is created for a
//! single render pass and consumed into a straight-alpha [`PixelBuffer`] at the
//! end, so no drawing context outlives the pass that opened it.

use inkpad_core::{Color, PixelBuffer, Size};
use tiny_skia::{FilterQuality, IntSize, Pixmap, PixmapPaint, Transform};

use crate::style::{StrokeBlend, ToSkia};

/// An offscreen RGBA drawing target
#[derive(Clone)]
pub struct Surface {
    pixmap: Pixmap,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .finish()
    }
}

impl Surface {
    /// A transparent surface covering `size`, rounded up to whole pixels
    ///
    /// Returns `None` when the size has no area.
    pub fn new(size: Size) -> Option<Self> {
        let (width, height) = size.to_pixels();
        Self::with_pixels(width, height)
    }

    pub fn with_pixels(width: u32, height: u32) -> Option<Self> {
        Pixmap::new(width, height).map(|pixmap| Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn fill(&mut self, color: Color) {
        self.pixmap.fill(color.to_skia());
    }

    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// Draw `other` over this surface at the origin
    pub fn composite(&mut self, other: &Surface, opacity: f32) {
        self.composite_with(other, opacity, StrokeBlend::Normal);
    }

    pub fn composite_with(&mut self, other: &Surface, opacity: f32, blend: StrokeBlend) {
        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0),
            blend_mode: blend.to_skia(),
            quality: FilterQuality::Nearest,
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            other.pixmap.as_ref(),
            &paint,
            Transform::identity(),
            None,
        );
    }

    /// Straight-alpha copy of the current contents
    pub fn to_pixel_buffer(&self) -> PixelBuffer {
        buffer_from_premultiplied(self.pixmap.data(), self.width(), self.height())
    }

    /// Consume the surface into straight-alpha pixels
    pub fn into_pixel_buffer(self) -> PixelBuffer {
        self.to_pixel_buffer()
    }
}

fn buffer_from_premultiplied(data: &[u8], width: u32, height: u32) -> PixelBuffer {
    let pixels = unpremultiply_alpha(data);
    PixelBuffer::from_rgba(pixels, width, height).unwrap_or_else(|e| {
        tracing::warn!("surface readback produced bad pixels: {}", e);
        PixelBuffer::empty()
    })
}

/// Convert a straight-alpha buffer into a pixmap tiny-skia can sample
///
/// Returns `None` for empty buffers.
pub fn pixmap_from_buffer(buffer: &PixelBuffer) -> Option<Pixmap> {
    let size = IntSize::from_wh(buffer.width(), buffer.height())?;
    Pixmap::from_vec(premultiply_alpha(buffer.data()), size)
}

fn premultiply_alpha(data: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(data.len());

    for chunk in data.chunks_exact(4) {
        let a = chunk[3] as u16;
        let mul = |c: u8| ((c as u16 * a + 127) / 255) as u8;
        result.extend_from_slice(&[mul(chunk[0]), mul(chunk[1]), mul(chunk[2]), chunk[3]]);
    }

    result
}

fn unpremultiply_alpha(data: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(data.len());

    for chunk in data.chunks_exact(4) {
        let a = chunk[3] as f32 / 255.0;
        if a > 0.0 {
            let r = (chunk[0] as f32 / a).round().min(255.0) as u8;
            let g = (chunk[1] as f32 / a).round().min(255.0) as u8;
            let b = (chunk[2] as f32 / a).round().min(255.0) as u8;
            result.extend_from_slice(&[r, g, b, chunk[3]]);
        } else {
            result.extend_from_slice(&[0, 0, 0, 0]);
        }
    }

    result
}

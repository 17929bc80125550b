//! Rendered frames
//!
//! A [`Frame`] is the ordered visual stack produced by one draw pass, bottom
//! first. Items are either a layer's stamped raster surface or its list of
//! vector shapes; the live preview, when present, is the last item.

use inkpad_core::{Color, PixelBuffer, Size};

use crate::shape::ShapeLayer;
use crate::surface::Surface;

/// Rendered content of one stack entry
#[derive(Clone, Debug)]
pub enum VisualContent {
    Raster(Surface),
    Shapes(Vec<ShapeLayer>),
}

/// One entry of the visual stack
#[derive(Clone, Debug)]
pub struct VisualItem {
    /// Source layer index, `None` for the live preview
    pub layer: Option<usize>,
    pub opacity: f32,
    pub content: VisualContent,
}

impl VisualItem {
    pub fn is_preview(&self) -> bool {
        self.layer.is_none()
    }

    pub fn shape_count(&self) -> usize {
        match &self.content {
            VisualContent::Shapes(shapes) => shapes.len(),
            VisualContent::Raster(_) => 0,
        }
    }

    fn composite_onto(&self, target: &mut Surface) {
        match &self.content {
            VisualContent::Raster(surface) => target.composite(surface, self.opacity),
            VisualContent::Shapes(shapes) => {
                let Some(mut scratch) = Surface::with_pixels(target.width(), target.height())
                else {
                    return;
                };
                for shape in shapes {
                    shape.render(&mut scratch);
                }
                target.composite(&scratch, self.opacity);
            }
        }
    }
}

/// Ordered visual stack, bottom to top
#[derive(Clone, Debug, Default)]
pub struct Frame {
    size: Size,
    items: Vec<VisualItem>,
}

impl Frame {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            items: Vec::new(),
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn items(&self) -> &[VisualItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Insert below everything already in the stack
    pub fn push_bottom(&mut self, item: VisualItem) {
        self.items.insert(0, item);
    }

    /// Insert above everything already in the stack
    pub fn push_top(&mut self, item: VisualItem) {
        self.items.push(item);
    }

    pub fn preview(&self) -> Option<&VisualItem> {
        self.items.last().filter(|item| item.is_preview())
    }

    /// Layer indices in stack order, bottom first
    pub fn layer_order(&self) -> Vec<usize> {
        self.items.iter().filter_map(|item| item.layer).collect()
    }

    /// Composite every item onto one surface
    ///
    /// Returns `None` when the frame has no area.
    pub fn flatten(&self, background: Option<Color>) -> Option<Surface> {
        let mut target = Surface::new(self.size)?;
        if let Some(color) = background {
            target.fill(color);
        }
        for item in &self.items {
            item.composite_onto(&mut target);
        }
        Some(target)
    }

    /// Flattened straight-alpha pixels, empty when the frame has no area
    pub fn to_pixel_buffer(&self, background: Option<Color>) -> PixelBuffer {
        self.flatten(background)
            .map(Surface::into_pixel_buffer)
            .unwrap_or_else(PixelBuffer::empty)
    }
}

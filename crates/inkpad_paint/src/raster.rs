//! Raster stamping
//!
//! Committed nodes are painted into a layer's pixel surface: each point group
//! becomes one connected stroke, erasers clear what is underneath, and image
//! nodes are drawn into the rectangle spanned by their corners.

use inkpad_core::{build_path, Node, PixelBuffer, Point, Rect, Size, ToolType};
use tiny_skia::{FillRule, FilterQuality, PixmapPaint, Transform};

use crate::style::{make_paint, NodeStyle, StrokeBlend, StyleOptions, TexturePattern, ToSkia};
use crate::surface::{pixmap_from_buffer, Surface};

/// Paints nodes into a [`Surface`]
#[derive(Clone, Copy, Debug)]
pub struct RasterPainter<'o> {
    options: &'o StyleOptions,
}

impl<'o> RasterPainter<'o> {
    pub fn new(options: &'o StyleOptions) -> Self {
        Self { options }
    }

    pub fn stamp_all(&self, surface: &mut Surface, nodes: &[Node]) {
        for node in nodes {
            self.stamp(surface, node);
        }
    }

    /// Paint one node with its own tool styling
    pub fn stamp(&self, surface: &mut Surface, node: &Node) {
        self.stamp_as(surface, node, node.tool());
    }

    /// Paint one node as if it had been drawn with `tool`
    pub fn stamp_as(&self, surface: &mut Surface, node: &Node, tool: ToolType) {
        let style = NodeStyle::for_tool(node, tool, self.options);

        if let Some(image) = node.image_data() {
            let corners = node.groups().first().map(Vec::as_slice).unwrap_or(&[]);
            draw_image(surface, image, corners, style.effective_opacity(), style.blend);
            return;
        }

        let pattern = style.texture.and_then(TexturePattern::new);
        let stroke = style.skia_stroke();
        let opacity = style.effective_opacity();
        let groups = node.groups();
        let instructions = node.instructions();

        for index in 0..groups.len() {
            let ops = instructions.get(index..=index).unwrap_or(&[]);
            let path = build_path(&groups[index..=index], ops, tool);
            let Some(path) = path.to_skia() else {
                continue;
            };

            if let Some(fill) = style.fill_color.filter(|_| tool.is_shape()) {
                let paint = make_paint(fill, opacity, style.blend, pattern.as_ref());
                surface.pixmap_mut().fill_path(
                    &path,
                    &paint,
                    FillRule::Winding,
                    Transform::identity(),
                    None,
                );
            }

            let paint = make_paint(style.stroke_color, opacity, style.blend, pattern.as_ref());
            surface
                .pixmap_mut()
                .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }
}

/// Draw `image` into the rectangle spanned by `corners`
///
/// The rectangle runs from corner 0 to corner 2 (corner 1 when only two are
/// given). The image is flipped vertically when corner 0 lies below the
/// opposite corner. Returns false when nothing was drawn.
pub fn draw_image(
    surface: &mut Surface,
    image: &PixelBuffer,
    corners: &[Point],
    opacity: f32,
    blend: StrokeBlend,
) -> bool {
    let Some(&origin) = corners.first() else {
        return false;
    };
    let Some(&opposite) = corners.get(2).or_else(|| corners.get(1)) else {
        return false;
    };
    let rect = Rect::from_points(origin, opposite);
    if rect.size().is_empty() {
        return false;
    }
    let Some(pixmap) = pixmap_from_buffer(image) else {
        tracing::trace!("image node has no pixels, skipping");
        return false;
    };

    let sx = rect.width() / pixmap.width() as f32;
    let sy = rect.height() / pixmap.height() as f32;
    let transform = if origin.y > opposite.y {
        Transform::from_row(sx, 0.0, 0.0, -sy, rect.x(), rect.max_y())
    } else {
        Transform::from_row(sx, 0.0, 0.0, sy, rect.x(), rect.y())
    };

    let paint = PixmapPaint {
        opacity: opacity.clamp(0.0, 1.0),
        blend_mode: blend.to_skia(),
        quality: FilterQuality::Bilinear,
    };
    surface
        .pixmap_mut()
        .draw_pixmap(0, 0, pixmap.as_ref(), &paint, transform, None);
    true
}

/// Rasterize `nodes` onto a fresh transparent surface of `size`
///
/// Returns an empty buffer when `size` has no area.
pub fn rasterize_nodes(nodes: &[Node], size: Size, options: &StyleOptions) -> PixelBuffer {
    let Some(mut surface) = Surface::new(size) else {
        return PixelBuffer::empty();
    };
    RasterPainter::new(options).stamp_all(&mut surface, nodes);
    surface.into_pixel_buffer()
}

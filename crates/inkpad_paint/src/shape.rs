//! Vector shape objects
//!
//! A vector layer keeps one [`ShapeLayer`] per node instead of a shared pixel
//! surface. Each shape carries its own geometry and styling and renders
//! independently, so the layer can be re-composited without re-stamping.

use inkpad_core::{Color, LineCap, LineJoin, Node, Path, PixelBuffer, Point, Rect, Texture, ToolType};
use tiny_skia::Transform;

use crate::raster::draw_image;
use crate::style::{make_paint, NodeStyle, StrokeBlend, StyleOptions, TexturePattern, ToSkia};
use crate::surface::Surface;

/// Where a fill or stroke takes its color from
#[derive(Clone, Debug, PartialEq)]
pub enum ShapePaint {
    Solid(Color),
    Texture(Texture),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShapeFillRule {
    #[default]
    NonZero,
    EvenOdd,
}

impl ToSkia for ShapeFillRule {
    type Output = tiny_skia::FillRule;

    fn to_skia(&self) -> Self::Output {
        match self {
            ShapeFillRule::NonZero => tiny_skia::FillRule::Winding,
            ShapeFillRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
        }
    }
}

/// Placed image content of a shape
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeImage {
    pub pixels: PixelBuffer,
    pub corners: Vec<Point>,
}

/// A self-contained renderable vector object
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeLayer {
    pub path: Path,
    /// Area covered by the shape including half the stroke width
    pub frame: Rect,
    pub fill: Option<ShapePaint>,
    pub fill_rule: ShapeFillRule,
    pub stroke: Option<ShapePaint>,
    pub line_width: f32,
    pub opacity: f32,
    pub miter_limit: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub dash: Vec<f32>,
    pub blend: StrokeBlend,
    pub image: Option<ShapeImage>,
}

impl ShapeLayer {
    /// Shape object for a node, styled by its own tool
    ///
    /// Returns `None` when the node has nothing to draw.
    pub fn from_node(node: &Node, options: &StyleOptions) -> Option<Self> {
        Self::from_node_as(node, node.tool(), options)
    }

    /// Shape object for a node styled as if drawn with `tool`
    pub fn from_node_as(node: &Node, tool: ToolType, options: &StyleOptions) -> Option<Self> {
        let style = NodeStyle::for_tool(node, tool, options);
        let path = node.path();

        let image = node.image_data().map(|pixels| ShapeImage {
            pixels: pixels.clone(),
            corners: node.corners().map(<[Point]>::to_vec).unwrap_or_default(),
        });
        if path.is_empty() && image.is_none() {
            return None;
        }

        let stroke = match style.texture {
            Some(texture) => ShapePaint::Texture(texture.clone()),
            None => ShapePaint::Solid(style.stroke_color),
        };
        let fill = style.fill_color.map(|color| match style.texture {
            Some(texture) => ShapePaint::Texture(texture.clone()),
            None => ShapePaint::Solid(color),
        });

        Some(Self {
            frame: path.bounds().outset(style.width / 2.0),
            path,
            fill,
            fill_rule: ShapeFillRule::NonZero,
            stroke: Some(stroke),
            line_width: style.width,
            opacity: style.effective_opacity(),
            miter_limit: style.miter_limit,
            cap: style.cap,
            join: style.join,
            dash: style.dash,
            blend: style.blend,
            image,
        })
    }

    /// All shapes for a run of nodes, skipping empty ones
    pub fn from_nodes(nodes: &[Node], options: &StyleOptions) -> Vec<Self> {
        nodes
            .iter()
            .filter_map(|node| Self::from_node(node, options))
            .collect()
    }

    pub fn render(&self, surface: &mut Surface) {
        if let Some(image) = &self.image {
            draw_image(surface, &image.pixels, &image.corners, self.opacity, self.blend);
            return;
        }

        let Some(path) = self.path.to_skia() else {
            return;
        };

        if let Some(fill) = &self.fill {
            let pattern = pattern_for(fill);
            let paint = make_paint(solid_or_black(fill), self.opacity, self.blend, pattern.as_ref());
            surface.pixmap_mut().fill_path(
                &path,
                &paint,
                self.fill_rule.to_skia(),
                Transform::identity(),
                None,
            );
        }

        if let Some(stroke_paint) = &self.stroke {
            if self.line_width <= 0.0 {
                return;
            }
            let pattern = pattern_for(stroke_paint);
            let paint = make_paint(
                solid_or_black(stroke_paint),
                self.opacity,
                self.blend,
                pattern.as_ref(),
            );
            let stroke = tiny_skia::Stroke {
                width: self.line_width,
                miter_limit: self.miter_limit.max(0.0),
                line_cap: self.cap.to_skia(),
                line_join: self.join.to_skia(),
                dash: if self.dash.is_empty() {
                    None
                } else {
                    tiny_skia::StrokeDash::new(self.dash.clone(), 0.0)
                },
            };
            surface
                .pixmap_mut()
                .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }
}

fn pattern_for(paint: &ShapePaint) -> Option<TexturePattern> {
    match paint {
        ShapePaint::Texture(texture) => TexturePattern::new(texture),
        ShapePaint::Solid(_) => None,
    }
}

fn solid_or_black(paint: &ShapePaint) -> Color {
    match paint {
        ShapePaint::Solid(color) => *color,
        ShapePaint::Texture(_) => Color::BLACK,
    }
}

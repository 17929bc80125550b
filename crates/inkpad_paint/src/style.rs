//! Style strategy tables
//!
//! Every mapping from inkpad styling enums to tiny-skia lives here, defined
//! once and shared by the raster and vector paths: caps, joins, tools, blend
//! modes. [`NodeStyle::resolve`] turns a node plus [`StyleOptions`] into the
//! concrete values a renderer needs, so no call site re-derives them.

use inkpad_core::{Color, LineCap, LineJoin, Node, Path, PathCommand, Texture, ToolType};
use serde::{Deserialize, Serialize};
use tiny_skia::{FilterQuality, Paint, Pattern, Pixmap, SpreadMode, Transform};

use crate::surface::pixmap_from_buffer;

/// Conversion into the tiny-skia equivalent
pub trait ToSkia {
    type Output;

    fn to_skia(&self) -> Self::Output;
}

impl ToSkia for LineCap {
    type Output = tiny_skia::LineCap;

    fn to_skia(&self) -> Self::Output {
        match self {
            LineCap::Butt => tiny_skia::LineCap::Butt,
            LineCap::Round => tiny_skia::LineCap::Round,
            LineCap::Square => tiny_skia::LineCap::Square,
        }
    }
}

impl ToSkia for LineJoin {
    type Output = tiny_skia::LineJoin;

    fn to_skia(&self) -> Self::Output {
        match self {
            LineJoin::Miter => tiny_skia::LineJoin::Miter,
            LineJoin::Round => tiny_skia::LineJoin::Round,
            LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
        }
    }
}

impl ToSkia for Color {
    type Output = tiny_skia::Color;

    fn to_skia(&self) -> Self::Output {
        let c = self.clamped();
        tiny_skia::Color::from_rgba(c.r, c.g, c.b, c.a).unwrap_or(tiny_skia::Color::BLACK)
    }
}

impl ToSkia for Path {
    type Output = Option<tiny_skia::Path>;

    /// `None` for paths tiny-skia considers empty
    fn to_skia(&self) -> Self::Output {
        let mut pb = tiny_skia::PathBuilder::new();
        for cmd in self.commands() {
            match cmd {
                PathCommand::MoveTo(p) => pb.move_to(p.x, p.y),
                PathCommand::LineTo(p) => pb.line_to(p.x, p.y),
                PathCommand::QuadTo { control, end } => {
                    pb.quad_to(control.x, control.y, end.x, end.y)
                }
                PathCommand::CubicTo {
                    control1,
                    control2,
                    end,
                } => pb.cubic_to(
                    control1.x, control1.y, control2.x, control2.y, end.x, end.y,
                ),
                PathCommand::Close => pb.close(),
            }
        }
        pb.finish()
    }
}

/// How a node's pixels combine with what is already on the surface
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StrokeBlend {
    /// Paint over existing content
    #[default]
    Normal,
    /// Remove existing content at full strength
    Erase,
}

impl ToSkia for StrokeBlend {
    type Output = tiny_skia::BlendMode;

    fn to_skia(&self) -> Self::Output {
        match self {
            StrokeBlend::Normal => tiny_skia::BlendMode::SourceOver,
            StrokeBlend::Erase => tiny_skia::BlendMode::Clear,
        }
    }
}

/// Rendering knobs that are not part of any brush
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOptions {
    /// Brush miter (0..=1) times this factor is the stroke miter limit
    pub miter_limit_scale: f32,
    /// Dash pattern for selection outlines
    pub selection_dash: Vec<f32>,
    /// Selection outline color
    pub selection_color: Color,
    /// Selection outline width
    pub selection_width: f32,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            miter_limit_scale: 10.0,
            selection_dash: vec![4.0, 4.0],
            selection_color: Color::BLACK,
            selection_width: 1.0,
        }
    }
}

/// Resolved styling for one node
#[derive(Clone, Debug)]
pub struct NodeStyle<'a> {
    pub stroke_color: Color,
    pub fill_color: Option<Color>,
    pub width: f32,
    pub opacity: f32,
    pub miter_limit: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub dash: Vec<f32>,
    pub blend: StrokeBlend,
    pub texture: Option<&'a Texture>,
}

impl<'a> NodeStyle<'a> {
    /// Styling for `node`, honoring the per-tool overrides
    pub fn resolve(node: &'a Node, options: &StyleOptions) -> Self {
        Self::for_tool(node, node.tool(), options)
    }

    /// Styling for `node` as if it were drawn with `tool`
    ///
    /// The live preview passes the active tool here so a selection marquee is
    /// always drawn as a selection.
    pub fn for_tool(node: &'a Node, tool: ToolType, options: &StyleOptions) -> Self {
        let brush = node.brush();
        let mut style = Self {
            stroke_color: brush.stroke_color(),
            fill_color: brush.fill_color(),
            width: brush.thickness(),
            opacity: brush.opacity(),
            miter_limit: brush.miter() * options.miter_limit_scale,
            cap: brush.cap(),
            join: brush.join(),
            dash: Vec::new(),
            blend: if brush.is_eraser() {
                StrokeBlend::Erase
            } else {
                StrokeBlend::Normal
            },
            texture: brush.texture(),
        };
        if tool == ToolType::Selection {
            style.apply_selection(options);
        }
        style
    }

    fn apply_selection(&mut self, options: &StyleOptions) {
        self.stroke_color = options.selection_color;
        self.fill_color = None;
        self.width = options.selection_width;
        self.opacity = 1.0;
        self.cap = LineCap::Butt;
        self.join = LineJoin::Miter;
        self.dash = options.selection_dash.clone();
        self.blend = StrokeBlend::Normal;
        self.texture = None;
    }

    /// Erasing ignores the node's own opacity
    pub fn effective_opacity(&self) -> f32 {
        match self.blend {
            StrokeBlend::Erase => 1.0,
            StrokeBlend::Normal => self.opacity.clamp(0.0, 1.0),
        }
    }

    /// tiny-skia stroke settings
    pub fn skia_stroke(&self) -> tiny_skia::Stroke {
        let dash = if self.dash.is_empty() {
            None
        } else {
            tiny_skia::StrokeDash::new(self.dash.clone(), 0.0)
        };
        tiny_skia::Stroke {
            width: self.width,
            miter_limit: self.miter_limit.max(0.0),
            line_cap: self.cap.to_skia(),
            line_join: self.join.to_skia(),
            dash,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Paint construction
// ─────────────────────────────────────────────────────────────────────────────

/// A brush texture ready to be used as a repeating shader
pub struct TexturePattern {
    pixmap: Pixmap,
    transform: Transform,
}

impl TexturePattern {
    /// `None` when the texture has no pixels
    pub fn new(texture: &Texture) -> Option<Self> {
        let pixmap = pixmap_from_buffer(&texture.image)?;
        let transform = if texture.size.is_empty() {
            Transform::identity()
        } else {
            Transform::from_scale(
                texture.size.width / pixmap.width() as f32,
                texture.size.height / pixmap.height() as f32,
            )
        };
        Some(Self { pixmap, transform })
    }

    fn shader(&self, opacity: f32) -> tiny_skia::Shader<'_> {
        Pattern::new(
            self.pixmap.as_ref(),
            SpreadMode::Repeat,
            FilterQuality::Bilinear,
            opacity,
            self.transform,
        )
    }
}

/// Paint for one fill or stroke pass
///
/// A pattern takes precedence over `color`.
pub fn make_paint(
    color: Color,
    opacity: f32,
    blend: StrokeBlend,
    pattern: Option<&TexturePattern>,
) -> Paint<'_> {
    let mut paint = Paint {
        anti_alias: true,
        blend_mode: blend.to_skia(),
        ..Paint::default()
    };
    match pattern {
        Some(pattern) => paint.shader = pattern.shader(opacity),
        None => paint.set_color(color.with_alpha(color.a * opacity).to_skia()),
    }
    paint
}

//! Stroke and shape records
//!
//! A [`Node`] is what a gesture leaves behind: the tool that made it, the
//! points it visited (grouped so one node can hold several sub-strokes), the
//! instructions that turn those points into path segments, the brush it was
//! drawn with and, for image nodes, the embedded pixels.
//!
//! Instructions are recorded as points arrive, so rendering never has to
//! re-derive shapes from the tool type.

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use crate::brush::Brush;
use crate::geometry::{Point, Rect};
use crate::path::Path;
use crate::path_builder::build_path;
use crate::pixels::PixelBuffer;

/// Ordered points of one sub-stroke
pub type PointGroup = Vec<Point>;

/// Instructions for one point group
pub type OpList = SmallVec<[PathOp; 8]>;

/// Cubic Bézier circle approximation constant
const KAPPA: f32 = 0.552_284_8;

/// Drawing tool that produced a node
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolType {
    #[default]
    Pen,
    Line,
    Rectangle,
    Ellipse,
    Eraser,
    Selection,
    Image,
}

impl ToolType {
    /// Freehand tools build polylines straight from their points
    pub const fn is_freehand(self) -> bool {
        matches!(self, ToolType::Pen | ToolType::Eraser)
    }

    /// Shape tools replace their points while the gesture is in progress
    /// instead of accumulating them
    pub const fn is_shape(self) -> bool {
        matches!(
            self,
            ToolType::Line | ToolType::Rectangle | ToolType::Ellipse | ToolType::Selection
        )
    }
}

/// One path-building instruction
///
/// Each op consumes points from its group in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathOp {
    MoveTo,
    LineTo,
    QuadTo,
    CubicTo,
    Close,
}

impl PathOp {
    /// Number of points this op consumes
    pub const fn points_needed(self) -> usize {
        match self {
            PathOp::MoveTo | PathOp::LineTo => 1,
            PathOp::QuadTo => 2,
            PathOp::CubicTo => 3,
            PathOp::Close => 0,
        }
    }
}

/// A committed or in-progress stroke/shape record
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    tool: ToolType,
    groups: Vec<PointGroup>,
    instructions: Vec<OpList>,
    brush: Brush,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<PixelBuffer>,
    /// Gesture origin of the current group for shape tools
    #[serde(skip)]
    anchor: Option<Point>,
}

impl Node {
    /// Start a gesture at `point`
    ///
    /// The brush is copied into the node. Eraser nodes always carry an
    /// eraser brush.
    pub fn begin(tool: ToolType, mut brush: Brush, point: Point) -> Self {
        if tool == ToolType::Eraser {
            brush.set_eraser(true);
        }
        let mut node = Self {
            tool,
            groups: Vec::new(),
            instructions: Vec::new(),
            brush,
            image: None,
            anchor: None,
        };
        node.begin_group(point);
        node
    }

    /// Build a node from recorded parts (used for replay and tests)
    pub fn from_parts(
        tool: ToolType,
        groups: Vec<PointGroup>,
        instructions: Vec<OpList>,
        brush: Brush,
    ) -> Self {
        Self {
            tool,
            groups,
            instructions,
            brush,
            image: None,
            anchor: None,
        }
    }

    /// Freehand polyline through `points` as a single group
    pub fn polyline(tool: ToolType, brush: Brush, points: &[Point]) -> Self {
        let ops = freehand_ops(points.len());
        Self::from_parts(tool, vec![points.to_vec()], vec![ops], brush)
    }

    /// An image node placed on the given corners
    ///
    /// Corners are top-left, top-right, bottom-right, bottom-left.
    pub fn image(image: PixelBuffer, corners: [Point; 4], brush: Brush) -> Self {
        let ops: OpList = smallvec![
            PathOp::MoveTo,
            PathOp::LineTo,
            PathOp::LineTo,
            PathOp::LineTo,
            PathOp::Close
        ];
        Self {
            tool: ToolType::Image,
            groups: vec![corners.to_vec()],
            instructions: vec![ops],
            brush,
            image: Some(image),
            anchor: None,
        }
    }

    /// Start a new sub-stroke within this gesture
    pub fn begin_group(&mut self, point: Point) {
        if self.tool == ToolType::Image {
            return;
        }
        self.groups.push(vec![point]);
        self.instructions.push(smallvec![PathOp::MoveTo]);
        self.anchor = Some(point);
        if self.tool.is_shape() {
            self.reshape_last_group(point);
        }
    }

    /// Extend the current sub-stroke to `point`
    pub fn push_point(&mut self, point: Point) {
        if self.tool == ToolType::Image {
            return;
        }
        if self.groups.is_empty() {
            self.begin_group(point);
            return;
        }
        if self.tool.is_shape() {
            self.reshape_last_group(point);
            return;
        }
        if let (Some(group), Some(ops)) = (self.groups.last_mut(), self.instructions.last_mut()) {
            group.push(point);
            ops.push(PathOp::LineTo);
        }
    }

    /// Regenerate the current group from its anchor and `current`
    fn reshape_last_group(&mut self, current: Point) {
        let anchor = self.anchor.unwrap_or(current);
        let (points, ops) = shape_geometry(self.tool, anchor, current);
        if let (Some(group), Some(list)) = (self.groups.last_mut(), self.instructions.last_mut()) {
            *group = points;
            *list = ops;
        }
    }

    pub fn tool(&self) -> ToolType {
        self.tool
    }

    pub fn groups(&self) -> &[PointGroup] {
        &self.groups
    }

    pub fn instructions(&self) -> &[OpList] {
        &self.instructions
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    pub fn image_data(&self) -> Option<&PixelBuffer> {
        self.image.as_ref()
    }

    /// Total number of recorded points across every group
    pub fn point_count(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    /// Placement corners of an image node
    pub fn corners(&self) -> Option<&[Point]> {
        if self.tool != ToolType::Image {
            return None;
        }
        self.groups.first().map(Vec::as_slice)
    }

    /// Renderable geometry for this node
    pub fn path(&self) -> Path {
        build_path(&self.groups, &self.instructions, self.tool)
    }

    /// Bounding box of the node's geometry, not including stroke width
    pub fn bounds(&self) -> Rect {
        self.path().bounds()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        // The gesture anchor is transient and not part of the record.
        self.tool == other.tool
            && self.groups == other.groups
            && self.instructions == other.instructions
            && self.brush == other.brush
            && self.image == other.image
    }
}

fn freehand_ops(count: usize) -> OpList {
    let mut ops = OpList::new();
    if count > 0 {
        ops.push(PathOp::MoveTo);
        ops.extend(std::iter::repeat(PathOp::LineTo).take(count - 1));
    }
    ops
}

/// Points and instructions for a shape spanned by a gesture
pub fn shape_geometry(tool: ToolType, anchor: Point, current: Point) -> (PointGroup, OpList) {
    match tool {
        ToolType::Line => (
            vec![anchor, current],
            smallvec![PathOp::MoveTo, PathOp::LineTo],
        ),
        ToolType::Rectangle | ToolType::Selection => (
            vec![
                anchor,
                Point::new(current.x, anchor.y),
                current,
                Point::new(anchor.x, current.y),
            ],
            smallvec![
                PathOp::MoveTo,
                PathOp::LineTo,
                PathOp::LineTo,
                PathOp::LineTo,
                PathOp::Close
            ],
        ),
        ToolType::Ellipse => ellipse_geometry(Rect::from_points(anchor, current)),
        ToolType::Pen | ToolType::Eraser | ToolType::Image => {
            (vec![anchor, current], freehand_ops(2))
        }
    }
}

fn ellipse_geometry(rect: Rect) -> (PointGroup, OpList) {
    let c = rect.center();
    let rx = rect.width() / 2.0;
    let ry = rect.height() / 2.0;
    let (kx, ky) = (rx * KAPPA, ry * KAPPA);

    let points = vec![
        Point::new(c.x + rx, c.y),
        Point::new(c.x + rx, c.y + ky),
        Point::new(c.x + kx, c.y + ry),
        Point::new(c.x, c.y + ry),
        Point::new(c.x - kx, c.y + ry),
        Point::new(c.x - rx, c.y + ky),
        Point::new(c.x - rx, c.y),
        Point::new(c.x - rx, c.y - ky),
        Point::new(c.x - kx, c.y - ry),
        Point::new(c.x, c.y - ry),
        Point::new(c.x + kx, c.y - ry),
        Point::new(c.x + rx, c.y - ky),
        Point::new(c.x + rx, c.y),
    ];
    let ops = smallvec![
        PathOp::MoveTo,
        PathOp::CubicTo,
        PathOp::CubicTo,
        PathOp::CubicTo,
        PathOp::CubicTo,
        PathOp::Close
    ];
    (points, ops)
}

//! Path construction from recorded points
//!
//! [`build_path`] is a pure function from (point groups, instructions, tool)
//! to a [`Path`]. Freehand tools draw a polyline through every group; every
//! other tool replays its recorded instructions literally.
//!
//! A group that cannot satisfy its instructions is skipped, never an error.

use crate::geometry::Point;
use crate::node::{OpList, PathOp, PointGroup, ToolType};
use crate::path::{Path, PathCommand};

/// Build renderable geometry for a node's points
pub fn build_path(groups: &[PointGroup], instructions: &[OpList], tool: ToolType) -> Path {
    let mut path = Path::new();

    for (index, group) in groups.iter().enumerate() {
        if group.is_empty() {
            continue;
        }

        if tool.is_freehand() {
            append_polyline(&mut path, group);
            continue;
        }

        let Some(ops) = instructions.get(index).filter(|ops| !ops.is_empty()) else {
            tracing::trace!(group = index, "no instructions for shape group, skipping");
            continue;
        };

        let needed: usize = ops.iter().map(|op| op.points_needed()).sum();
        if group.len() < needed {
            tracing::trace!(
                group = index,
                needed,
                available = group.len(),
                "not enough points for instructions, skipping"
            );
            continue;
        }

        append_ops(&mut path, group, ops);
    }

    path
}

fn append_polyline(path: &mut Path, points: &[Point]) {
    let first = points[0];
    path.push(PathCommand::MoveTo(first));
    if points.len() == 1 {
        // Zero-length segment so a tap still produces a capped dot
        path.push(PathCommand::LineTo(first));
        return;
    }
    for point in &points[1..] {
        path.push(PathCommand::LineTo(*point));
    }
}

fn append_ops(path: &mut Path, points: &[Point], ops: &[PathOp]) {
    let mut cursor = points.iter().copied();
    // Lengths were checked by the caller, so every `next()` below succeeds.
    let mut next = || cursor.next().unwrap_or_default();

    for op in ops {
        let command = match op {
            PathOp::MoveTo => PathCommand::MoveTo(next()),
            PathOp::LineTo => PathCommand::LineTo(next()),
            PathOp::QuadTo => {
                let control = next();
                let end = next();
                PathCommand::QuadTo { control, end }
            }
            PathOp::CubicTo => {
                let control1 = next();
                let control2 = next();
                let end = next();
                PathCommand::CubicTo {
                    control1,
                    control2,
                    end,
                }
            }
            PathOp::Close => PathCommand::Close,
        };
        path.push(command);
    }
}

//! inkpad core types
//!
//! The data side of the drawing engine:
//!
//! - **Brush**: styling copied into every stroke, with a tolerant persisted
//!   layout
//! - **Node**: a stroke or shape record (points, instructions, brush, image)
//! - **Path builder**: pure geometry construction from recorded points
//! - **Undo/redo**: a linear command log
//! - **PixelBuffer**: the raw RGBA image type used at every boundary
//!
//! # Example
//!
//! ```rust
//! use inkpad_core::{Brush, Node, Point, ToolType};
//!
//! let mut node = Node::begin(ToolType::Pen, Brush::default(), Point::new(0.0, 0.0));
//! node.push_point(Point::new(10.0, 10.0));
//!
//! let path = node.path();
//! assert_eq!(path.commands().len(), 2);
//! ```

pub mod brush;
pub mod geometry;
pub mod history;
pub mod node;
pub mod path;
pub mod path_builder;
pub mod pixels;

pub use brush::{Brush, BrushRecord, LineCap, LineJoin, Texture, DEFAULT_THICKNESS, MIN_THICKNESS};
pub use geometry::{Color, Point, Rect, Size};
pub use history::{Command, UndoRedoManager};
pub use node::{shape_geometry, Node, OpList, PathOp, PointGroup, ToolType};
pub use path::{Path, PathCommand};
pub use path_builder::build_path;
pub use pixels::{PixelBuffer, PixelError, PixelRecord};

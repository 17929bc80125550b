//! inkpad painting
//!
//! CPU rendering for the drawing engine, built on tiny-skia:
//!
//! - [`Surface`]: a scoped offscreen pixmap, read back as straight RGBA
//! - [`RasterPainter`]: stamps nodes into a layer surface
//! - [`ShapeLayer`]: one retained vector object per node
//! - [`Frame`]: the bottom-to-top visual stack of a draw pass
//!
//! Styling decisions (caps, joins, blend, tool overrides) are made once in
//! [`style`] and shared by both rendering paths.

pub mod frame;
pub mod raster;
pub mod shape;
pub mod style;
pub mod surface;

pub use frame::{Frame, VisualContent, VisualItem};
pub use raster::{draw_image, rasterize_nodes, RasterPainter};
pub use shape::{ShapeFillRule, ShapeImage, ShapeLayer, ShapePaint};
pub use style::{NodeStyle, StrokeBlend, StyleOptions, TexturePattern, ToSkia};
pub use surface::{pixmap_from_buffer, Surface};

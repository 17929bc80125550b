//! inkpad canvas engine
//!
//! Interactive drawing on a stack of layers:
//!
//! - [`CanvasEngine`]: strokes, selection, clipboard, images, undo/redo,
//!   compositing and export
//! - [`CanvasLayer`]: ordered nodes rendered as raster or vector content
//! - [`CanvasCommand`]: the undo/redo command objects
//! - [`CanvasObserver`]: callbacks fired after engine mutations
//! - [`CanvasConfig`]: presets and TOML loading
//!
//! # Example
//!
//! ```rust
//! use inkpad_canvas::{CanvasConfig, CanvasEngine, CanvasLayer, LayerPosition};
//! use inkpad_core::Point;
//!
//! let mut engine = CanvasEngine::new(CanvasConfig::testing());
//! engine.add_layer(CanvasLayer::raster(), LayerPosition::Top);
//!
//! engine.begin_stroke(Point::new(5.0, 5.0)).unwrap();
//! engine.extend_stroke(Point::new(30.0, 30.0)).unwrap();
//! engine.commit_stroke().unwrap();
//!
//! assert!(engine.export().has_visible_pixels());
//! engine.undo();
//! assert!(!engine.export().has_visible_pixels());
//! ```

pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod layer;
pub mod observer;

#[cfg(test)]
mod tests;

pub use command::{CanvasCommand, CommandOutcome};
pub use config::CanvasConfig;
pub use engine::{CanvasEngine, LayerPosition, Selection};
pub use error::{CanvasError, ConfigError, Result};
pub use layer::{CanvasLayer, LayerKind};
pub use observer::CanvasObserver;

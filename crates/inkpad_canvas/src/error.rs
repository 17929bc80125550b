//! Error types for inkpad_canvas

use std::io;
use thiserror::Error;

/// Why an engine mutation was refused
///
/// The engine state is unchanged whenever one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    /// Layer index does not exist
    #[error("layer {index} out of range (layer count {count})")]
    LayerOutOfRange { index: usize, count: usize },

    /// Operation needs an active layer and there is none
    #[error("no active layer")]
    NoActiveLayer,

    /// Stroke operation called while idle
    #[error("no stroke in progress")]
    NoStrokeInProgress,

    /// Operation not allowed while a stroke is being built
    #[error("a stroke is already in progress")]
    StrokeInProgress,

    /// Image has no pixels
    #[error("image has no pixels")]
    EmptyImage,
}

/// Errors loading a [`CanvasConfig`](crate::CanvasConfig)
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error when reading the file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// TOML parsing error
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, CanvasError>;

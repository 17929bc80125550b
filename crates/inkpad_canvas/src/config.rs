//! Engine configuration presets.

use std::path::Path;

use inkpad_core::{Color, Size};
use inkpad_paint::StyleOptions;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for a [`CanvasEngine`](crate::CanvasEngine).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Size of the drawing surface; also the size of full exports.
    pub view_size: Size,
    /// Maximum number of undo entries kept (`None` = unbounded).
    pub history_limit: Option<usize>,
    /// Dash pattern used for the selection marquee.
    pub selection_dash: Vec<f32>,
    /// Color of the selection marquee.
    pub selection_color: Color,
    /// Brush miter (0..=1) is multiplied by this to get the stroke miter limit.
    pub miter_limit_scale: f32,
    /// Background painted under full exports (`None` = transparent).
    pub background: Option<Color>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl CanvasConfig {
    /// Standard configuration for general use.
    pub fn standard() -> Self {
        Self {
            view_size: Size::new(1024.0, 768.0),
            history_limit: None,
            selection_dash: vec![4.0, 4.0],
            selection_color: Color::BLACK,
            miter_limit_scale: 10.0,
            background: None,
        }
    }

    /// Small history and surface for constrained hosts.
    pub fn minimal() -> Self {
        Self {
            view_size: Size::new(512.0, 512.0),
            history_limit: Some(32),
            ..Self::standard()
        }
    }

    /// Testing configuration: tiny deterministic surface.
    pub fn testing() -> Self {
        Self {
            view_size: Size::new(40.0, 40.0),
            history_limit: None,
            ..Self::standard()
        }
    }

    /// Set the view size.
    pub fn with_view_size(mut self, size: Size) -> Self {
        self.view_size = size;
        self
    }

    /// Set the undo history limit.
    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history_limit = limit;
        self
    }

    /// Set the selection marquee dash pattern.
    pub fn with_selection_dash(mut self, dash: Vec<f32>) -> Self {
        self.selection_dash = dash;
        self
    }

    /// Set the selection marquee color.
    pub fn with_selection_color(mut self, color: Color) -> Self {
        self.selection_color = color;
        self
    }

    /// Set the miter limit scale.
    pub fn with_miter_limit_scale(mut self, scale: f32) -> Self {
        self.miter_limit_scale = scale;
        self
    }

    /// Set the export background.
    pub fn with_background(mut self, color: Option<Color>) -> Self {
        self.background = color;
        self
    }

    /// Parse a TOML document; missing keys take their standard values.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Load a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Rendering options derived from this config.
    pub fn style_options(&self) -> StyleOptions {
        StyleOptions {
            miter_limit_scale: self.miter_limit_scale,
            selection_dash: self.selection_dash.clone(),
            selection_color: self.selection_color,
            ..StyleOptions::default()
        }
    }
}

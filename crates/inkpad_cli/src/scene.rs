//! Scene files
//!
//! A scene is a JSON description of layers and the strokes and images drawn on
//! them. Replaying it drives a [`CanvasEngine`] through the same calls an
//! interactive host would make, so the result has real undo history.

use anyhow::{Context, Result};
use inkpad_canvas::{CanvasConfig, CanvasEngine, CanvasLayer, LayerKind, LayerPosition};
use inkpad_core::{Brush, PixelBuffer, Point, Rect, ToolType};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Top-level scene document
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Scene {
    /// Engine configuration; the standard preset when absent
    #[serde(default)]
    pub config: Option<CanvasConfig>,
    #[serde(default)]
    pub layers: Vec<SceneLayer>,
}

/// One layer and what is drawn on it, in order
#[derive(Debug, Deserialize, Serialize)]
pub struct SceneLayer {
    #[serde(default)]
    pub kind: LayerKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub strokes: Vec<SceneStroke>,
    #[serde(default)]
    pub images: Vec<SceneImage>,
}

fn default_opacity() -> f32 {
    1.0
}

fn default_visible() -> bool {
    true
}

/// A gesture: one point list per sub-stroke
#[derive(Debug, Deserialize, Serialize)]
pub struct SceneStroke {
    #[serde(default)]
    pub tool: ToolType,
    #[serde(default)]
    pub brush: Brush,
    pub groups: Vec<Vec<Point>>,
}

/// An image file placed inside `frame`
#[derive(Debug, Deserialize, Serialize)]
pub struct SceneImage {
    /// Relative paths resolve against the scene file's directory
    pub path: PathBuf,
    pub frame: Rect,
}

impl Scene {
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).context("Failed to parse scene JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene {}", path.display()))?;
        Self::from_json(&source)
    }

    /// Replay the scene into a fresh engine
    ///
    /// `config` overrides the scene's own configuration. Image paths are
    /// resolved against `base_dir`.
    pub fn build(&self, config: Option<CanvasConfig>, base_dir: &Path) -> Result<CanvasEngine> {
        let config = config
            .or_else(|| self.config.clone())
            .unwrap_or_default();
        let mut engine = CanvasEngine::new(config);

        for (index, layer) in self.layers.iter().enumerate() {
            let mut canvas_layer = CanvasLayer::new(layer.kind)
                .with_opacity(layer.opacity)
                .with_visible(layer.visible);
            if let Some(name) = &layer.name {
                canvas_layer = canvas_layer.with_name(name.clone());
            }
            engine.add_layer(canvas_layer, LayerPosition::Top);

            for stroke in &layer.strokes {
                replay_stroke(&mut engine, stroke)
                    .with_context(|| format!("Failed to replay stroke on layer {}", index))?;
            }

            for image in &layer.images {
                let path = base_dir.join(&image.path);
                let pixels = load_image(&path)?;
                engine
                    .draw_image(pixels, image.frame)
                    .with_context(|| format!("Failed to place image {}", path.display()))?;
            }

            debug!(
                "layer {} ({}) replayed with {} nodes",
                index,
                layer.kind.name(),
                engine.layer(index).map_or(0, CanvasLayer::len)
            );
        }

        Ok(engine)
    }
}

fn replay_stroke(engine: &mut CanvasEngine, stroke: &SceneStroke) -> Result<()> {
    let mut groups = stroke.groups.iter().filter(|group| !group.is_empty());
    let Some(first) = groups.next() else {
        warn!("stroke with no points skipped");
        return Ok(());
    };

    engine.set_tool(stroke.tool);
    engine.set_brush(stroke.brush.clone());

    engine.begin_stroke(first[0])?;
    for &point in &first[1..] {
        engine.extend_stroke(point)?;
    }
    for group in groups {
        engine.begin_stroke_group(group[0])?;
        for &point in &group[1..] {
            engine.extend_stroke(point)?;
        }
    }
    engine.commit_stroke()?;
    Ok(())
}

/// Decode an image file into straight RGBA pixels
pub fn load_image(path: &Path) -> Result<PixelBuffer> {
    let decoded = image::open(path)
        .with_context(|| format!("Failed to decode image {}", path.display()))?
        .to_rgba8();
    let (width, height) = decoded.dimensions();
    Ok(PixelBuffer::from_rgba(decoded.into_raw(), width, height)?)
}

/// Encode pixels as a PNG file
pub fn write_png(pixels: PixelBuffer, path: &Path) -> Result<()> {
    if pixels.is_empty() {
        anyhow::bail!("Nothing to write: the rendered image is empty");
    }
    let (width, height) = (pixels.width(), pixels.height());
    let buffer = image::RgbaImage::from_raw(width, height, pixels.into_data())
        .context("Pixel buffer does not match its dimensions")?;
    buffer
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

//! Canvas engine
//!
//! Owns the layer stack, the in-progress stroke, the clipboard and the undo
//! history. Input arrives as points; every structural change records an
//! undo/redo pair and raises the redraw flag. [`CanvasEngine::draw`] turns the
//! current state into a bottom-to-top [`Frame`].

use inkpad_core::{Brush, Node, PixelBuffer, Point, Rect, Size, ToolType, UndoRedoManager};
use inkpad_paint::{rasterize_nodes, Frame, ShapeLayer, StyleOptions, VisualContent, VisualItem};

use crate::command::{CanvasCommand, CommandOutcome};
use crate::config::CanvasConfig;
use crate::error::{CanvasError, Result};
use crate::layer::CanvasLayer;
use crate::observer::CanvasObserver;

/// Where [`CanvasEngine::add_layer`] inserts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayerPosition {
    #[default]
    Top,
    Bottom,
}

/// Result of committing a selection stroke
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    /// Marquee bounds
    pub bounds: Rect,
    /// Layer the selected indices refer to
    pub layer: Option<usize>,
    /// Nodes of that layer whose bounds intersect the marquee
    pub nodes: Vec<usize>,
}

/// The interactive drawing engine
pub struct CanvasEngine {
    config: CanvasConfig,
    style: StyleOptions,
    layers: Vec<CanvasLayer>,
    active_layer: Option<usize>,
    tool: ToolType,
    brush: Brush,
    current: Option<Node>,
    clipboard: Vec<Node>,
    selection: Option<Selection>,
    has_embedded_raster: bool,
    redraw_requested: bool,
    history: UndoRedoManager<CanvasCommand>,
    observer: Option<Box<dyn CanvasObserver>>,
}

impl std::fmt::Debug for CanvasEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasEngine")
            .field("layers", &self.layers.len())
            .field("active_layer", &self.active_layer)
            .field("tool", &self.tool)
            .field("stroking", &self.current.is_some())
            .field("undo", &self.history.undo_len())
            .field("redo", &self.history.redo_len())
            .finish()
    }
}

impl Default for CanvasEngine {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl CanvasEngine {
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            style: config.style_options(),
            history: UndoRedoManager::with_limit(config.history_limit),
            config,
            layers: Vec::new(),
            active_layer: None,
            tool: ToolType::default(),
            brush: Brush::default(),
            current: None,
            clipboard: Vec::new(),
            selection: None,
            has_embedded_raster: false,
            redraw_requested: false,
            observer: None,
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn view_size(&self) -> Size {
        self.config.view_size
    }

    pub fn set_view_size(&mut self, size: Size) {
        self.config.view_size = size;
        self.request_redraw();
    }

    pub fn set_observer(&mut self, observer: Box<dyn CanvasObserver>) {
        self.observer = Some(observer);
    }

    pub fn take_observer(&mut self) -> Option<Box<dyn CanvasObserver>> {
        self.observer.take()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Layers
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a layer and make it active
    ///
    /// Inserting at the bottom shifts every existing index up by one. Stored
    /// history and the selection follow their layers.
    pub fn add_layer(&mut self, layer: CanvasLayer, position: LayerPosition) -> usize {
        let index = match position {
            LayerPosition::Top => {
                self.layers.push(layer);
                self.layers.len() - 1
            }
            LayerPosition::Bottom => {
                self.layers.insert(0, layer);
                self.history.retain_mut(|command| {
                    *command.layer_mut() += 1;
                    true
                });
                if let Some(selection) = self.selection.as_mut() {
                    selection.layer = selection.layer.map(|i| i + 1);
                }
                0
            }
        };
        self.active_layer = Some(index);
        tracing::debug!(index, count = self.layers.len(), "layer added");
        self.request_redraw();
        index
    }

    /// Remove a layer
    ///
    /// History entries for the removed layer are dropped. Entries for layers
    /// above it are shifted down with them.
    pub fn remove_layer(&mut self, index: usize) -> Result<CanvasLayer> {
        self.check_layer(index)?;
        let removed = self.layers.remove(index);
        self.history.retain_mut(|command| {
            let layer = command.layer_mut();
            if *layer == index {
                return false;
            }
            if *layer > index {
                *layer -= 1;
            }
            true
        });

        self.active_layer = match self.active_layer {
            _ if self.layers.is_empty() => None,
            Some(active) if active > index => Some(active - 1),
            Some(active) if active == index => Some(index.min(self.layers.len() - 1)),
            other => other,
        };
        match self.selection.as_ref().and_then(|s| s.layer) {
            Some(layer) if layer == index => self.selection = None,
            Some(layer) if layer > index => {
                if let Some(selection) = self.selection.as_mut() {
                    selection.layer = Some(layer - 1);
                }
            }
            _ => {}
        }

        tracing::debug!(index, count = self.layers.len(), "layer removed");
        self.request_redraw();
        Ok(removed)
    }

    pub fn set_active_layer(&mut self, index: usize) -> Result<()> {
        self.check_layer(index)?;
        self.active_layer = Some(index);
        Ok(())
    }

    pub fn active_layer(&self) -> Option<usize> {
        self.active_layer
    }

    pub fn set_layer_visible(&mut self, index: usize, visible: bool) -> Result<()> {
        self.check_layer(index)?;
        self.layers[index].set_visible(visible);
        self.request_redraw();
        Ok(())
    }

    pub fn set_layer_opacity(&mut self, index: usize, opacity: f32) -> Result<()> {
        self.check_layer(index)?;
        self.layers[index].set_opacity(opacity);
        self.request_redraw();
        Ok(())
    }

    pub fn layer(&self, index: usize) -> Option<&CanvasLayer> {
        self.layers.get(index)
    }

    pub fn layers(&self) -> &[CanvasLayer] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    fn check_layer(&self, index: usize) -> Result<()> {
        if index < self.layers.len() {
            Ok(())
        } else {
            let err = CanvasError::LayerOutOfRange {
                index,
                count: self.layers.len(),
            };
            tracing::debug!("{}", err);
            Err(err)
        }
    }

    fn active_index(&self) -> Result<usize> {
        match self.active_layer {
            Some(index) if index < self.layers.len() => Ok(index),
            _ => {
                tracing::debug!("no active layer");
                Err(CanvasError::NoActiveLayer)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tool and brush
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_tool(&mut self, tool: ToolType) {
        self.tool = tool;
    }

    pub fn tool(&self) -> ToolType {
        self.tool
    }

    pub fn brush(&self) -> &Brush {
        &self.brush
    }

    pub fn brush_mut(&mut self) -> &mut Brush {
        &mut self.brush
    }

    pub fn set_brush(&mut self, brush: Brush) {
        self.brush = brush;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Strokes
    // ─────────────────────────────────────────────────────────────────────────

    /// Start a gesture with the current tool and a copy of the current brush
    pub fn begin_stroke(&mut self, point: Point) -> Result<()> {
        if self.current.is_some() {
            tracing::debug!("begin_stroke while a stroke is in progress");
            return Err(CanvasError::StrokeInProgress);
        }
        if self.tool != ToolType::Selection {
            self.active_index()?;
        }
        self.current = Some(Node::begin(self.tool, self.brush.clone(), point));
        tracing::trace!(x = point.x, y = point.y, tool = ?self.tool, "stroke begun");
        self.request_redraw();
        Ok(())
    }

    pub fn extend_stroke(&mut self, point: Point) -> Result<()> {
        let node = self.current_mut()?;
        node.push_point(point);
        tracing::trace!(x = point.x, y = point.y, "stroke extended");
        self.request_redraw();
        Ok(())
    }

    /// Start a new sub-stroke inside the current gesture
    pub fn begin_stroke_group(&mut self, point: Point) -> Result<()> {
        let node = self.current_mut()?;
        node.begin_group(point);
        tracing::trace!(x = point.x, y = point.y, "stroke group begun");
        self.request_redraw();
        Ok(())
    }

    /// Finish the gesture
    ///
    /// A selection stroke only updates [`CanvasEngine::selection`]. Any other
    /// stroke is appended to the active layer with an undo entry. A stroke
    /// with no points is dropped.
    pub fn commit_stroke(&mut self) -> Result<()> {
        let Some(node) = self.current.as_ref() else {
            tracing::debug!("commit_stroke with no stroke in progress");
            return Err(CanvasError::NoStrokeInProgress);
        };

        if node.tool() == ToolType::Selection {
            let bounds = node.bounds();
            self.current = None;
            self.select(bounds);
            self.request_redraw();
            return Ok(());
        }

        let index = self.active_index()?;
        let Some(node) = self.current.take() else {
            return Err(CanvasError::NoStrokeInProgress);
        };
        if node.point_count() == 0 {
            tracing::debug!("empty stroke discarded");
            self.request_redraw();
            return Ok(());
        }

        self.layers[index].append(node.clone());
        self.history.add(
            CanvasCommand::RemoveLast {
                layer: index,
                count: 1,
            },
            CanvasCommand::Append {
                layer: index,
                nodes: vec![node],
            },
        );
        tracing::debug!(layer = index, "stroke committed");
        self.request_redraw();
        Ok(())
    }

    /// Drop the in-progress stroke
    pub fn cancel_stroke(&mut self) -> Result<()> {
        if self.current.take().is_none() {
            tracing::debug!("cancel_stroke with no stroke in progress");
            return Err(CanvasError::NoStrokeInProgress);
        }
        self.request_redraw();
        Ok(())
    }

    pub fn is_stroking(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_stroke(&self) -> Option<&Node> {
        self.current.as_ref()
    }

    fn current_mut(&mut self) -> Result<&mut Node> {
        match self.current.as_mut() {
            Some(node) => Ok(node),
            None => {
                tracing::debug!("no stroke in progress");
                Err(CanvasError::NoStrokeInProgress)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection and clipboard
    // ─────────────────────────────────────────────────────────────────────────

    fn select(&mut self, bounds: Rect) {
        let layer = self.active_layer.filter(|&i| i < self.layers.len());
        let nodes = layer
            .map(|i| {
                self.layers[i]
                    .nodes()
                    .iter()
                    .enumerate()
                    .filter(|(_, node)| node.bounds().intersects(&bounds))
                    .map(|(index, _)| index)
                    .collect()
            })
            .unwrap_or_default();
        tracing::debug!(?layer, ?nodes, "selection updated");
        self.selection = Some(Selection {
            bounds,
            layer,
            nodes,
        });
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn clear_selection(&mut self) {
        if self.selection.take().is_some() {
            self.request_redraw();
        }
    }

    /// Replace the clipboard with a snapshot of `nodes`
    pub fn copy(&mut self, nodes: &[Node]) {
        self.clipboard = nodes.to_vec();
        tracing::debug!(count = nodes.len(), "nodes copied");
        if let Some(observer) = self.observer.as_mut() {
            observer.on_copy_nodes(&self.clipboard);
        }
    }

    /// Copy the selected nodes; returns how many were copied
    ///
    /// Without a selection the clipboard is left alone.
    pub fn copy_selection(&mut self) -> usize {
        let Some(selection) = self.selection.as_ref() else {
            tracing::debug!("copy_selection without a selection");
            return 0;
        };
        let Some(layer) = selection.layer.and_then(|i| self.layers.get(i)) else {
            return 0;
        };
        let nodes: Vec<Node> = selection
            .nodes
            .iter()
            .filter_map(|&i| layer.node(i).cloned())
            .collect();
        let count = nodes.len();
        self.copy(&nodes);
        count
    }

    pub fn clipboard(&self) -> &[Node] {
        &self.clipboard
    }

    /// Append the clipboard to the active layer; returns the pasted count
    ///
    /// An empty clipboard pastes nothing and records no history, but still
    /// requests a redraw.
    pub fn paste(&mut self) -> Result<usize> {
        let index = self.active_index()?;
        self.request_redraw();
        if self.clipboard.is_empty() {
            tracing::debug!("paste with empty clipboard");
            return Ok(0);
        }

        let count = self.clipboard.len();
        self.layers[index].extend(self.clipboard.iter().cloned());
        self.history.add(
            CanvasCommand::RemoveLast {
                layer: index,
                count,
            },
            CanvasCommand::Append {
                layer: index,
                nodes: self.clipboard.clone(),
            },
        );
        tracing::debug!(layer = index, count, "nodes pasted");
        if let Some(observer) = self.observer.as_mut() {
            observer.on_paste_nodes(index, &self.clipboard);
        }
        Ok(count)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Images
    // ─────────────────────────────────────────────────────────────────────────

    /// Place an image on the active layer; returns its node index
    ///
    /// The image keeps its aspect ratio and is centered in `frame`. A frame
    /// without area places the image at natural size on the frame origin.
    pub fn draw_image(&mut self, image: PixelBuffer, frame: Rect) -> Result<usize> {
        let index = self.active_index()?;
        if image.is_empty() {
            tracing::warn!("draw_image with an empty image");
            return Err(CanvasError::EmptyImage);
        }

        let placement = if frame.size().is_empty() {
            Rect::from_origin_size(frame.origin, image.size())
        } else {
            frame.aspect_fit(image.size())
        };
        let node = Node::image(image, placement.corners(), self.brush.clone());

        let layer = &mut self.layers[index];
        layer.append(node.clone());
        let node_index = layer.len() - 1;
        self.has_embedded_raster = true;
        self.history.add(
            CanvasCommand::RemoveLast {
                layer: index,
                count: 1,
            },
            CanvasCommand::Append {
                layer: index,
                nodes: vec![node],
            },
        );
        tracing::debug!(layer = index, ?placement, "image placed");
        self.request_redraw();

        if let (Some(observer), Some(node)) =
            (self.observer.as_mut(), self.layers[index].node(node_index))
        {
            observer.on_draw_image(index, node);
        }
        Ok(node_index)
    }

    /// Whether any image has been placed since the engine was created
    pub fn has_embedded_raster(&self) -> bool {
        self.has_embedded_raster
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Clearing and history
    // ─────────────────────────────────────────────────────────────────────────

    /// Clear one layer as an undoable step
    pub fn clear_layer(&mut self, index: usize) -> Result<()> {
        self.check_layer(index)?;
        let snapshot = self.layers[index].replace_nodes(Vec::new());
        self.history.add(
            CanvasCommand::Replace {
                layer: index,
                nodes: snapshot,
            },
            CanvasCommand::Replace {
                layer: index,
                nodes: Vec::new(),
            },
        );
        self.history.clear_redos();
        tracing::debug!(layer = index, "layer cleared");
        self.request_redraw();
        Ok(())
    }

    /// Clear every layer, one undo entry per layer
    pub fn clear(&mut self) {
        for index in 0..self.layers.len() {
            // Indices come from the live range, so this cannot fail.
            let _ = self.clear_layer(index);
        }
    }

    pub fn undo(&mut self) -> Option<CommandOutcome> {
        let Some(outcome) = self.history.perform_undo(&mut self.layers) else {
            tracing::debug!("nothing to undo");
            return None;
        };
        self.request_redraw();
        if let Some(observer) = self.observer.as_mut() {
            observer.on_undo(&outcome);
        }
        Some(outcome)
    }

    pub fn redo(&mut self) -> Option<CommandOutcome> {
        let Some(outcome) = self.history.perform_redo(&mut self.layers) else {
            tracing::debug!("nothing to redo");
            return None;
        };
        self.request_redraw();
        if let Some(observer) = self.observer.as_mut() {
            observer.on_redo(&outcome);
        }
        Some(outcome)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &UndoRedoManager<CanvasCommand> {
        &self.history
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────

    pub fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }

    pub fn needs_redraw(&self) -> bool {
        self.redraw_requested
    }

    /// Read and reset the redraw flag
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    /// Build the visual stack and clear the redraw flag
    pub fn draw(&mut self) -> Frame {
        let frame = self.compose();
        self.redraw_requested = false;
        frame
    }

    /// Build the visual stack without touching engine state
    ///
    /// Layers are walked top-down and each item is inserted at the bottom, so
    /// the stack ends bottom-to-top. The in-progress stroke goes last, except
    /// an eraser stroke, which is rendered into the active layer so it clears
    /// that layer's pixels live.
    pub fn compose(&self) -> Frame {
        let size = self.config.view_size;
        let mut frame = Frame::new(size);

        let erasing_layer = self
            .current
            .as_ref()
            .filter(|node| node.brush().is_eraser() && self.tool != ToolType::Selection)
            .and(self.active_layer)
            .filter(|&index| index < self.layers.len());

        for (index, layer) in self.layers.iter().enumerate().rev() {
            if !layer.is_visible() {
                tracing::trace!(layer = index, "hidden layer skipped");
                continue;
            }
            let live = self
                .current
                .as_ref()
                .filter(|_| erasing_layer == Some(index))
                .map(|node| (node, self.tool));
            let Some(content) = layer.kind().render_with(layer.nodes(), live, size, &self.style)
            else {
                tracing::trace!(layer = index, "no surface for layer");
                continue;
            };
            frame.push_bottom(VisualItem {
                layer: Some(index),
                opacity: layer.opacity(),
                content,
            });
        }

        if let Some(preview) = self
            .current
            .as_ref()
            .filter(|_| erasing_layer.is_none())
            .and_then(|node| ShapeLayer::from_node_as(node, self.tool, &self.style))
        {
            frame.push_top(VisualItem {
                layer: None,
                opacity: 1.0,
                content: VisualContent::Shapes(vec![preview]),
            });
        }

        frame
    }

    /// Flatten everything on screen, preview included, at the view size
    pub fn export(&self) -> PixelBuffer {
        self.compose().to_pixel_buffer(self.config.background)
    }

    /// Render one layer's committed nodes at the view size
    ///
    /// Empty when the index is invalid or the layer has no nodes.
    pub fn export_layer(&self, index: usize) -> PixelBuffer {
        let Some(layer) = self.layers.get(index).filter(|layer| !layer.is_empty()) else {
            tracing::debug!(layer = index, "nothing to export");
            return PixelBuffer::empty();
        };
        let size = self.config.view_size;
        let Some(content) = layer.kind().render(layer.nodes(), size, &self.style) else {
            return PixelBuffer::empty();
        };
        let mut frame = Frame::new(size);
        frame.push_top(VisualItem {
            layer: Some(index),
            opacity: 1.0,
            content,
        });
        frame.to_pixel_buffer(None)
    }

    /// Rasterize arbitrary nodes onto a transparent image of `size`
    ///
    /// Empty for an empty node list or a size without area.
    pub fn export_nodes(nodes: &[Node], size: Size) -> PixelBuffer {
        if nodes.is_empty() {
            return PixelBuffer::empty();
        }
        rasterize_nodes(nodes, size, &StyleOptions::default())
    }
}

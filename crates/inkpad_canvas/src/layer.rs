//! Canvas layers
//!
//! A layer is an ordered list of committed nodes plus how those nodes are
//! rendered. The rendering strategy is picked once per [`LayerKind`] and
//! never changes for the life of the layer.

use inkpad_core::{Node, Size, ToolType};
use inkpad_paint::{RasterPainter, ShapeLayer, StyleOptions, Surface, VisualContent};
use serde::{Deserialize, Serialize};

/// Rendering strategy of a layer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Nodes are stamped into one pixel surface
    #[default]
    Raster,
    /// Each node is kept as its own shape object
    Vector,
}

impl LayerKind {
    pub fn name(self) -> &'static str {
        match self {
            LayerKind::Raster => "raster",
            LayerKind::Vector => "vector",
        }
    }

    /// Render `nodes` with this strategy
    ///
    /// Returns `None` when a raster surface cannot be created for `size`.
    pub fn render(self, nodes: &[Node], size: Size, options: &StyleOptions) -> Option<VisualContent> {
        self.render_with(nodes, None, size, options)
    }

    /// Render `nodes` followed by an uncommitted node styled as `tool`
    ///
    /// The live node lands in the same content as the committed ones, so an
    /// eraser gesture clears this layer's pixels before it is committed.
    pub fn render_with(
        self,
        nodes: &[Node],
        live: Option<(&Node, ToolType)>,
        size: Size,
        options: &StyleOptions,
    ) -> Option<VisualContent> {
        match self {
            LayerKind::Raster => {
                let mut surface = Surface::new(size)?;
                let painter = RasterPainter::new(options);
                painter.stamp_all(&mut surface, nodes);
                if let Some((node, tool)) = live {
                    painter.stamp_as(&mut surface, node, tool);
                }
                Some(VisualContent::Raster(surface))
            }
            LayerKind::Vector => {
                let mut shapes = ShapeLayer::from_nodes(nodes, options);
                if let Some((node, tool)) = live {
                    shapes.extend(ShapeLayer::from_node_as(node, tool, options));
                }
                Some(VisualContent::Shapes(shapes))
            }
        }
    }
}

/// An ordered, independently toggleable collection of nodes
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasLayer {
    kind: LayerKind,
    nodes: Vec<Node>,
    visible: bool,
    opacity: f32,
    name: String,
}

impl CanvasLayer {
    pub fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            nodes: Vec::new(),
            visible: true,
            opacity: 1.0,
            name: kind.name().to_string(),
        }
    }

    pub fn raster() -> Self {
        Self::new(LayerKind::Raster)
    }

    pub fn vector() -> Self {
        Self::new(LayerKind::Vector)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.set_opacity(opacity);
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.nodes.get_mut(index)
    }

    pub fn append(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn extend(&mut self, nodes: impl IntoIterator<Item = Node>) {
        self.nodes.extend(nodes);
    }

    pub fn remove_last(&mut self) -> Option<Node> {
        self.nodes.pop()
    }

    /// Remove up to `count` nodes from the top, returned in paint order
    pub fn truncate_last(&mut self, count: usize) -> Vec<Node> {
        let keep = self.nodes.len().saturating_sub(count);
        self.nodes.split_off(keep)
    }

    /// Swap in a new node list, returning the old one
    pub fn replace_nodes(&mut self, nodes: Vec<Node>) -> Vec<Node> {
        std::mem::replace(&mut self.nodes, nodes)
    }

    /// Remove every node; kind, visibility, opacity and name are kept
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Clamped to 0..=1; NaN means fully opaque
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_nan() {
            1.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkpad_core::{Brush, Point, ToolType};

    fn dot(x: f32) -> Node {
        Node::polyline(ToolType::Pen, Brush::default(), &[Point::new(x, x)])
    }

    #[test]
    fn test_clear_keeps_settings() {
        let mut layer = CanvasLayer::vector()
            .with_name("ink")
            .with_opacity(0.4)
            .with_visible(false)
            .with_nodes(vec![dot(1.0), dot(2.0)]);

        layer.clear();

        assert!(layer.is_empty());
        assert_eq!(layer.kind(), LayerKind::Vector);
        assert_eq!(layer.name(), "ink");
        assert_eq!(layer.opacity(), 0.4);
        assert!(!layer.is_visible());
    }

    #[test]
    fn test_truncate_last_returns_paint_order() {
        let mut layer = CanvasLayer::raster().with_nodes(vec![dot(1.0), dot(2.0), dot(3.0)]);

        let removed = layer.truncate_last(2);
        assert_eq!(removed, vec![dot(2.0), dot(3.0)]);
        assert_eq!(layer.nodes(), &[dot(1.0)]);

        assert_eq!(layer.truncate_last(10), vec![dot(1.0)]);
        assert!(layer.truncate_last(1).is_empty());
    }

    #[test]
    fn test_out_of_range_access() {
        let mut layer = CanvasLayer::raster().with_nodes(vec![dot(1.0)]);
        assert!(layer.node(1).is_none());
        assert!(layer.node_mut(5).is_none());
        assert!(layer.node(0).is_some());
        assert_eq!(layer.remove_last(), Some(dot(1.0)));
        assert_eq!(layer.remove_last(), None);
    }

    #[test]
    fn test_opacity_is_clamped() {
        let mut layer = CanvasLayer::raster();
        layer.set_opacity(3.0);
        assert_eq!(layer.opacity(), 1.0);
        layer.set_opacity(-1.0);
        assert_eq!(layer.opacity(), 0.0);
        layer.set_opacity(f32::NAN);
        assert_eq!(layer.opacity(), 1.0);
    }

    #[test]
    fn test_kind_selects_content() {
        let options = StyleOptions::default();
        let nodes = [dot(4.0), dot(8.0)];

        let raster = LayerKind::Raster.render(&nodes, Size::new(10.0, 10.0), &options);
        assert!(matches!(raster, Some(VisualContent::Raster(_))));

        match LayerKind::Vector.render(&nodes, Size::new(10.0, 10.0), &options) {
            Some(VisualContent::Shapes(shapes)) => assert_eq!(shapes.len(), 2),
            other => panic!("unexpected content: {:?}", other),
        }

        assert!(LayerKind::Raster.render(&nodes, Size::ZERO, &options).is_none());
    }
}

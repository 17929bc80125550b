//! Engine event observer

use inkpad_core::Node;

use crate::command::CommandOutcome;

/// Receives engine events after the mutation has been applied
///
/// Every method defaults to doing nothing.
pub trait CanvasObserver {
    fn on_undo(&mut self, _outcome: &CommandOutcome) {}

    fn on_redo(&mut self, _outcome: &CommandOutcome) {}

    fn on_copy_nodes(&mut self, _nodes: &[Node]) {}

    fn on_paste_nodes(&mut self, _layer: usize, _nodes: &[Node]) {}

    fn on_draw_image(&mut self, _layer: usize, _node: &Node) {}
}

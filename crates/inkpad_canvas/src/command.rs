//! Undo/redo command objects
//!
//! Every history entry is a pair of [`CanvasCommand`]s. A command names the
//! layer by index and owns the node snapshot it needs, and is executed by the
//! single applier in [`Command::apply`].

use inkpad_core::{Command, Node};

use crate::layer::CanvasLayer;

/// A reversible layer mutation
#[derive(Clone, Debug, PartialEq)]
pub enum CanvasCommand {
    /// Append `nodes` to the top of the layer
    Append { layer: usize, nodes: Vec<Node> },
    /// Remove the top `count` nodes of the layer
    RemoveLast { layer: usize, count: usize },
    /// Replace the layer's whole node list
    Replace { layer: usize, nodes: Vec<Node> },
}

impl CanvasCommand {
    pub fn layer(&self) -> usize {
        match self {
            CanvasCommand::Append { layer, .. }
            | CanvasCommand::RemoveLast { layer, .. }
            | CanvasCommand::Replace { layer, .. } => *layer,
        }
    }

    pub fn layer_mut(&mut self) -> &mut usize {
        match self {
            CanvasCommand::Append { layer, .. }
            | CanvasCommand::RemoveLast { layer, .. }
            | CanvasCommand::Replace { layer, .. } => layer,
        }
    }
}

/// What applying a command did
#[derive(Clone, Debug, PartialEq)]
pub enum CommandOutcome {
    Appended { layer: usize, count: usize },
    Removed { layer: usize, nodes: Vec<Node> },
    Replaced { layer: usize, previous: Vec<Node> },
    /// The target layer no longer exists
    Skipped { layer: usize },
}

impl CommandOutcome {
    pub fn layer(&self) -> usize {
        match self {
            CommandOutcome::Appended { layer, .. }
            | CommandOutcome::Removed { layer, .. }
            | CommandOutcome::Replaced { layer, .. }
            | CommandOutcome::Skipped { layer } => *layer,
        }
    }
}

impl Command<Vec<CanvasLayer>> for CanvasCommand {
    type Output = CommandOutcome;

    fn apply(&self, layers: &mut Vec<CanvasLayer>) -> CommandOutcome {
        let index = self.layer();
        let Some(target) = layers.get_mut(index) else {
            tracing::debug!(layer = index, "history command targets a missing layer");
            return CommandOutcome::Skipped { layer: index };
        };

        match self {
            CanvasCommand::Append { nodes, .. } => {
                target.extend(nodes.iter().cloned());
                CommandOutcome::Appended {
                    layer: index,
                    count: nodes.len(),
                }
            }
            CanvasCommand::RemoveLast { count, .. } => CommandOutcome::Removed {
                layer: index,
                nodes: target.truncate_last(*count),
            },
            CanvasCommand::Replace { nodes, .. } => CommandOutcome::Replaced {
                layer: index,
                previous: target.replace_nodes(nodes.clone()),
            },
        }
    }
}

//! Undo/redo functionality for tracking and reversing board edits.
//!
//! Every committed gesture is recorded as an [`UndoAction`]. Applying an
//! action reverses it and yields the action that would reverse it again, so
//! redo is simply undo applied to the inverse.

use crate::board::Board;
use crate::constants::MAX_UNDO_HISTORY;
use crate::types::*;

/// Represents different types of actions that can be undone.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoAction {
    /// A node was created
    NodeCreated { node_id: NodeId },
    /// A node was deleted together with its connections
    NodeDeleted {
        node: BoardNode,
        neighbors: Vec<NodeId>,
    },
    /// A node was moved from one position to another
    NodeMoved {
        node_id: NodeId,
        old_position: (f32, f32),
        new_position: (f32, f32),
    },
    /// A connection between two nodes was toggled
    ConnectionToggled { a: NodeId, b: NodeId },
    /// A node's anchor flag was toggled
    AnchorToggled { node_id: NodeId },
}

/// Manages undo/redo history for the application.
#[derive(Debug, Clone, Default)]
pub struct UndoHistory {
    /// Stack of actions that can be undone
    undo_stack: Vec<UndoAction>,
    /// Stack of actions that can be redone
    redo_stack: Vec<UndoAction>,
}

impl UndoHistory {
    /// Creates a new empty undo history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an action to the undo history.
    ///
    /// This clears the redo stack since a new action invalidates any previously undone actions.
    pub fn push_action(&mut self, action: UndoAction) {
        self.redo_stack.clear();
        self.push_undo(action);
    }

    /// Pushes onto the undo stack without touching the redo stack.
    pub fn push_undo(&mut self, action: UndoAction) {
        self.undo_stack.push(action);
        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Returns true if there are actions that can be undone.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are actions that can be redone.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Pops the most recent action from the undo stack.
    pub fn pop_undo(&mut self) -> Option<UndoAction> {
        self.undo_stack.pop()
    }

    /// Pops the most recent action from the redo stack.
    pub fn pop_redo(&mut self) -> Option<UndoAction> {
        self.redo_stack.pop()
    }

    /// Pushes an action onto the redo stack.
    pub fn push_redo(&mut self, action: UndoAction) {
        self.redo_stack.push(action);
    }

    /// Clears all undo and redo history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

/// Extension methods for applying undo actions to a board.
pub trait UndoableBoard {
    /// Reverses `action`, returning the action that reverses it again.
    ///
    /// Returns `None` if the board no longer matches what the action expects
    /// (for instance the node it refers to is gone).
    fn apply_undo(&mut self, action: &UndoAction) -> Option<UndoAction>;
}

impl UndoableBoard for Board {
    fn apply_undo(&mut self, action: &UndoAction) -> Option<UndoAction> {
        match action {
            UndoAction::NodeCreated { node_id } => {
                let (node, pairs) = self.remove_node(*node_id).ok()?;
                let neighbors = pairs.iter().filter_map(|p| p.other(*node_id)).collect();
                Some(UndoAction::NodeDeleted { node, neighbors })
            }
            UndoAction::NodeDeleted { node, neighbors } => {
                self.restore_node(node.clone(), neighbors).ok()?;
                Some(UndoAction::NodeCreated { node_id: node.id })
            }
            UndoAction::NodeMoved {
                node_id,
                old_position,
                new_position,
            } => self.move_node(*node_id, *old_position).then(|| UndoAction::NodeMoved {
                node_id: *node_id,
                old_position: *new_position,
                new_position: *old_position,
            }),
            UndoAction::ConnectionToggled { a, b } => {
                self.toggle_connection(*a, *b).ok()?;
                Some(action.clone())
            }
            UndoAction::AnchorToggled { node_id } => {
                self.toggle_anchor(*node_id).ok()?;
                Some(action.clone())
            }
        }
    }
}

//! The board: one node registry plus one connection graph.
//!
//! `Board` is an explicit value owned by the top-level loop and lent to the
//! drag state machine, the layout, the renderer and the persistence code.
//! Every mutation entry point enforces the unique-id and unordered-pair
//! invariants; rejected operations are logged and returned, never panicked on.

use std::collections::{BTreeSet, HashSet};

use log::{debug, warn};

use crate::connections::ConnectionGraph;
use crate::error::BoardError;
use crate::hit_test;
use crate::registry::NodeRegistry;
use crate::types::*;

/// A complete board scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    nodes: NodeRegistry,
    connections: ConnectionGraph,
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the node registry.
    pub fn nodes(&self) -> &NodeRegistry {
        &self.nodes
    }

    /// Read access to the connection graph.
    pub fn connections(&self) -> &ConnectionGraph {
        &self.connections
    }

    /// Looks up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&BoardNode> {
        self.nodes.get(id)
    }

    /// Places a new node on top of the stack and returns its id.
    ///
    /// A non-finite position, or a size that is not finite and non-negative,
    /// is rejected with `MalformedState` and nothing is inserted.
    pub fn insert_node(
        &mut self,
        image_ref: ImageRef,
        position: (f32, f32),
        size: (f32, f32),
    ) -> Result<NodeId, BoardError> {
        let Some(node) = self.nodes.insert(image_ref.clone(), position, size) else {
            warn!("Rejected node {image_ref} at {position:?} with size {size:?}");
            return Err(BoardError::MalformedState(format!(
                "node {image_ref} has invalid position {position:?} or size {size:?}"
            )));
        };
        debug!("Inserted node {} ({}) at {:?}", node.id, node.image_ref, node.position);
        Ok(node.id)
    }

    /// Moves a node; unknown ids are logged and ignored.
    pub fn move_node(&mut self, id: NodeId, position: (f32, f32)) -> bool {
        let moved = self.nodes.move_node(id, position);
        if !moved {
            warn!("Ignoring move of node {id} to {position:?}");
        }
        moved
    }

    /// Deletes a node and every connection that touches it.
    ///
    /// # Returns
    ///
    /// The removed node and the pairs that were dropped with it, or
    /// `UnknownNodeId` if there was nothing to remove.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(BoardNode, Vec<NodePair>), BoardError> {
        let Some(node) = self.nodes.remove(id) else {
            warn!("Ignoring removal of unknown node {id}");
            return Err(BoardError::UnknownNodeId(id));
        };
        let pairs = self.connections.remove_all_for(id);
        debug!("Removed node {id} and {} connection(s)", pairs.len());
        Ok((node, pairs))
    }

    /// Puts back a node removed by [`Board::remove_node`] together with its
    /// connections. Used by undo.
    pub fn restore_node(&mut self, node: BoardNode, neighbors: &[NodeId]) -> Result<(), BoardError> {
        let id = node.id;
        if !self.nodes.reinsert(node) {
            return Err(BoardError::MalformedState(format!("node {id} already exists")));
        }
        for neighbor in neighbors {
            if !self.connections.has_connection(id, *neighbor) {
                if let Err(err) = self.connections.toggle(&self.nodes, id, *neighbor) {
                    warn!("Could not restore connection {id} - {neighbor}: {err}");
                }
            }
        }
        Ok(())
    }

    /// Raises a node above all others.
    pub fn bring_to_front(&mut self, id: NodeId) -> bool {
        let raised = self.nodes.bring_to_front(id);
        if !raised {
            warn!("Ignoring bring-to-front of unknown node {id}");
        }
        raised
    }

    /// Flips a node's anchored flag, returning the new value.
    pub fn toggle_anchor(&mut self, id: NodeId) -> Result<bool, BoardError> {
        self.nodes
            .toggle_anchor(id)
            .ok_or(BoardError::UnknownNodeId(id))
    }

    /// Connects or disconnects two nodes, regardless of argument order.
    pub fn toggle_connection(&mut self, a: NodeId, b: NodeId) -> Result<bool, BoardError> {
        match self.connections.toggle(&self.nodes, a, b) {
            Ok(connected) => {
                debug!(
                    "{} {a} and {b}",
                    if connected { "Connected" } else { "Disconnected" }
                );
                Ok(connected)
            }
            Err(err) => {
                warn!("Rejected connection toggle {a} - {b}: {err}");
                Err(err)
            }
        }
    }

    /// Symmetric membership test.
    pub fn has_connection(&self, a: NodeId, b: NodeId) -> bool {
        self.connections.has_connection(a, b)
    }

    /// Neighbours of a node.
    pub fn connections_of(&self, id: NodeId) -> BTreeSet<NodeId> {
        self.connections.connections_of(id)
    }

    /// Topmost node under `point`, optionally ignoring one node.
    pub fn hit_test(&self, point: (f32, f32), exclude: Option<NodeId>) -> Option<&BoardNode> {
        hit_test::hit_test(&self.nodes, point, exclude)
    }

    /// Nodes in draw order (z ascending).
    pub fn draw_order(&self) -> Vec<&BoardNode> {
        self.nodes.draw_order()
    }

    /// Every connection resolved to its two endpoint centres.
    pub fn connection_segments(&self) -> Vec<ConnectionSegment> {
        self.connections
            .iter()
            .filter_map(|pair| {
                let (a, b) = pair.ids();
                let from = self.nodes.get(a)?.center();
                let to = self.nodes.get(b)?.center();
                Some(ConnectionSegment {
                    pair: *pair,
                    from,
                    to,
                })
            })
            .collect()
    }

    /// Removes every node and connection.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Exports the full board state.
    pub fn snapshot(&self) -> BoardState {
        BoardState {
            nodes: self.nodes.iter().cloned().collect(),
            connections: self
                .connections
                .iter()
                .map(|pair| {
                    let (a, b) = pair.ids();
                    [a, b]
                })
                .collect(),
        }
    }

    /// Replaces the whole board with `state`.
    ///
    /// The state is validated first; on any error the board is left exactly
    /// as it was. Connections are collapsed to canonical pairs, so `[a, b]`
    /// and `[b, a]` in the same file become one connection.
    pub fn restore(&mut self, state: BoardState) -> Result<(), BoardError> {
        match Self::validate(state) {
            Ok(board) => {
                debug!(
                    "Restored board with {} node(s) and {} connection(s)",
                    board.nodes.len(),
                    board.connections.len()
                );
                *self = board;
                Ok(())
            }
            Err(err) => {
                warn!("Rejected board state: {err}");
                Err(err)
            }
        }
    }

    fn validate(state: BoardState) -> Result<Self, BoardError> {
        let mut ids = HashSet::new();
        for node in &state.nodes {
            if !ids.insert(node.id) {
                return Err(BoardError::MalformedState(format!(
                    "duplicate node id {}",
                    node.id
                )));
            }
            if !node.is_well_formed() {
                return Err(BoardError::MalformedState(format!(
                    "node {} has invalid position {:?} or size {:?}",
                    node.id, node.position, node.size
                )));
            }
        }

        let mut pairs = BTreeSet::new();
        for [a, b] in state.connections {
            for id in [a, b] {
                if !ids.contains(&id) {
                    return Err(BoardError::MalformedState(format!(
                        "connection {a} - {b} references missing node {id}"
                    )));
                }
            }
            let pair = NodePair::new(a, b).ok_or_else(|| {
                BoardError::MalformedState(format!("connection from node {a} to itself"))
            })?;
            pairs.insert(pair);
        }

        Ok(Self {
            nodes: NodeRegistry::from_nodes(state.nodes),
            connections: ConnectionGraph::from_pairs(pairs),
        })
    }

    /// Serialize the board to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        self.snapshot().to_json()
    }

    /// Replaces the board with the state encoded in `json`.
    ///
    /// Parse failures are reported as `MalformedState` as well.
    pub fn restore_json(&mut self, json: &str) -> Result<(), BoardError> {
        let state = BoardState::from_json(json)
            .map_err(|err| BoardError::MalformedState(err.to_string()))?;
        self.restore(state)
    }

    /// Builds a new board from JSON.
    pub fn from_json(json: &str) -> Result<Self, BoardError> {
        let mut board = Self::new();
        board.restore_json(json)?;
        Ok(board)
    }

    /// Mutable access to the registry for crate-internal collaborators
    /// (layout) that only move nodes.
    pub(crate) fn nodes_mut(&mut self) -> &mut NodeRegistry {
        &mut self.nodes
    }
}

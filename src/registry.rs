//! Node registry: owns every placed node and its stacking order.

use crate::types::*;

/// The set of nodes placed on a board.
///
/// Nodes are kept in insertion order; that order is the tie-break for equal
/// z-orders and the order nodes appear in snapshots. The registry is small
/// and mutated interactively, so lookups are linear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeRegistry {
    nodes: Vec<BoardNode>,
}

impl NodeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a new image on the board above every existing node.
    ///
    /// # Arguments
    ///
    /// * `image_ref` - The image the node displays
    /// * `position` - Top-left corner in board coordinates
    /// * `size` - Node size, usually derived from the image dimensions
    ///
    /// # Returns
    ///
    /// The newly inserted node, or `None` if the position is not finite or
    /// the size is not finite and non-negative.
    pub fn insert(
        &mut self,
        image_ref: ImageRef,
        position: (f32, f32),
        size: (f32, f32),
    ) -> Option<&BoardNode> {
        let mut node = BoardNode::new(image_ref, position, size);
        if !node.is_well_formed() {
            return None;
        }
        node.z_order = self.next_z_order();
        self.nodes.push(node);
        self.nodes.last()
    }

    /// Re-inserts a previously removed node at its old id.
    ///
    /// Returns `false` if a node with that id is already present.
    pub fn reinsert(&mut self, node: BoardNode) -> bool {
        if self.contains(node.id) {
            return false;
        }
        self.nodes.push(node);
        true
    }

    /// Moves a node to a new top-left position.
    ///
    /// Returns `false` (and changes nothing) when the id is absent or the
    /// position is not finite. A missing id is expected: a node may be deleted
    /// while it is being dragged.
    pub fn move_node(&mut self, id: NodeId, new_position: (f32, f32)) -> bool {
        if !is_finite_point(new_position) {
            return false;
        }
        match self.get_mut(id) {
            Some(node) => {
                node.position = new_position;
                true
            }
            None => false,
        }
    }

    /// Removes a node, returning it if it existed.
    ///
    /// Connections are not owned here; the caller is responsible for dropping
    /// every connection that touches `id`.
    pub fn remove(&mut self, id: NodeId) -> Option<BoardNode> {
        let index = self.nodes.iter().position(|n| n.id == id)?;
        Some(self.nodes.remove(index))
    }

    /// Raises a node above every other node.
    ///
    /// A node that is already the unique top keeps its z-order. Returns
    /// `false` if the id is absent.
    pub fn bring_to_front(&mut self, id: NodeId) -> bool {
        let Some(current) = self.get(id).map(|n| n.z_order) else {
            return false;
        };
        let already_top = self
            .nodes
            .iter()
            .all(|n| n.id == id || n.z_order < current);
        if !already_top {
            let z = self.next_z_order();
            if let Some(node) = self.get_mut(id) {
                node.z_order = z;
            }
        }
        true
    }

    /// Pins or unpins a node. Returns `false` if the id is absent.
    pub fn set_anchored(&mut self, id: NodeId, anchored: bool) -> bool {
        match self.get_mut(id) {
            Some(node) => {
                node.anchored = anchored;
                true
            }
            None => false,
        }
    }

    /// Flips a node's anchored flag, returning the new value.
    pub fn toggle_anchor(&mut self, id: NodeId) -> Option<bool> {
        let node = self.get_mut(id)?;
        node.anchored = !node.anchored;
        Some(node.anchored)
    }

    /// Looks up a node by id.
    pub fn get(&self, id: NodeId) -> Option<&BoardNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut BoardNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Whether a node with this id exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of nodes on the board.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the board has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &BoardNode> {
        self.nodes.iter()
    }

    /// Nodes sorted for drawing: z-order ascending, older nodes first on ties.
    pub fn draw_order(&self) -> Vec<&BoardNode> {
        let mut ordered: Vec<(usize, &BoardNode)> = self.nodes.iter().enumerate().collect();
        ordered.sort_by_key(|(index, node)| (node.z_order, *index));
        ordered.into_iter().map(|(_, node)| node).collect()
    }

    /// A z-order above every node. Renumbers the stack to `0..n` when the
    /// current maximum cannot be incremented.
    fn next_z_order(&mut self) -> i64 {
        let Some(max) = self.nodes.iter().map(|n| n.z_order).max() else {
            return 0;
        };
        match max.checked_add(1) {
            Some(z) => z,
            None => {
                self.compact_z_orders();
                self.nodes.len() as i64
            }
        }
    }

    /// Renumbers z-orders to `0..n`, keeping draw order (ties stay broken by
    /// insertion order).
    fn compact_z_orders(&mut self) {
        let ranked: Vec<NodeId> = self.draw_order().iter().map(|n| n.id).collect();
        for (rank, id) in ranked.into_iter().enumerate() {
            if let Some(node) = self.get_mut(id) {
                node.z_order = rank as i64;
            }
        }
    }

    /// Builds a registry from already-validated nodes, preserving their order.
    pub(crate) fn from_nodes(nodes: Vec<BoardNode>) -> Self {
        Self { nodes }
    }
}

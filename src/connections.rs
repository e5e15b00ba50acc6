//! Undirected connections between nodes.
//!
//! All storage is keyed by [`NodePair`], the canonical unordered pair. A drag
//! of B onto A and a drag of A onto B therefore address the same entry, and
//! toggling either way always flips the same boolean.

use std::collections::BTreeSet;

use crate::error::BoardError;
use crate::registry::NodeRegistry;
use crate::types::*;

/// The set of links between nodes on a board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionGraph {
    pairs: BTreeSet<NodePair>,
}

impl ConnectionGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects `a` and `b` if they are not connected, disconnects them otherwise.
    ///
    /// # Arguments
    ///
    /// * `registry` - Used only to check that both ids exist
    /// * `a` - One endpoint, in whatever order the gesture presented it
    /// * `b` - The other endpoint
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the pair is connected afterwards, `Ok(false)` if it was
    /// disconnected. `SelfConnection` or `UnknownNodeId` leave the graph untouched.
    pub fn toggle(
        &mut self,
        registry: &NodeRegistry,
        a: NodeId,
        b: NodeId,
    ) -> Result<bool, BoardError> {
        let pair = NodePair::new(a, b).ok_or(BoardError::SelfConnection(a))?;
        for id in [a, b] {
            if !registry.contains(id) {
                return Err(BoardError::UnknownNodeId(id));
            }
        }

        if self.pairs.remove(&pair) {
            Ok(false)
        } else {
            self.pairs.insert(pair);
            Ok(true)
        }
    }

    /// Symmetric membership test.
    pub fn has_connection(&self, a: NodeId, b: NodeId) -> bool {
        NodePair::new(a, b).is_some_and(|pair| self.pairs.contains(&pair))
    }

    /// Whether this exact canonical pair is present.
    pub fn contains(&self, pair: &NodePair) -> bool {
        self.pairs.contains(pair)
    }

    /// Every node linked to `id`.
    pub fn connections_of(&self, id: NodeId) -> BTreeSet<NodeId> {
        self.pairs.iter().filter_map(|pair| pair.other(id)).collect()
    }

    /// Drops every connection touching `id`, returning the removed pairs.
    pub fn remove_all_for(&mut self, id: NodeId) -> Vec<NodePair> {
        let removed: Vec<NodePair> = self
            .pairs
            .iter()
            .filter(|pair| pair.touches(id))
            .copied()
            .collect();
        for pair in &removed {
            self.pairs.remove(pair);
        }
        removed
    }

    /// Iterates all pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &NodePair> {
        self.pairs.iter()
    }

    /// Number of connections.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether there are no connections.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Builds a graph from already-validated pairs.
    pub(crate) fn from_pairs(pairs: BTreeSet<NodePair>) -> Self {
        Self { pairs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn registry_with(count: usize) -> (NodeRegistry, Vec<NodeId>) {
        let mut registry = NodeRegistry::new();
        let ids = (0..count)
            .map(|i| {
                registry
                    .insert("n.png".into(), (i as f32 * 60.0, 0.0), (50.0, 50.0))
                    .unwrap()
                    .id
            })
            .collect();
        (registry, ids)
    }

    #[test]
    fn test_toggle_inserts_then_removes() {
        let (registry, ids) = registry_with(2);
        let mut graph = ConnectionGraph::new();

        assert_eq!(graph.toggle(&registry, ids[0], ids[1]), Ok(true));
        assert!(graph.has_connection(ids[0], ids[1]));
        assert!(graph.has_connection(ids[1], ids[0]));

        assert_eq!(graph.toggle(&registry, ids[0], ids[1]), Ok(false));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_reverse_drag_breaks_connection() {
        // A dragged onto B creates the link; B dragged onto A must clear it.
        let (registry, ids) = registry_with(2);
        let (a, b) = (ids[0], ids[1]);
        let mut graph = ConnectionGraph::new();

        graph.toggle(&registry, a, b).unwrap();
        assert!(graph.has_connection(a, b));

        assert_eq!(graph.toggle(&registry, b, a), Ok(false));
        assert!(!graph.has_connection(a, b));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_self_connection_rejected() {
        let (registry, ids) = registry_with(1);
        let mut graph = ConnectionGraph::new();

        assert_eq!(
            graph.toggle(&registry, ids[0], ids[0]),
            Err(BoardError::SelfConnection(ids[0]))
        );
        assert!(graph.is_empty());
    }

    #[test]
    fn test_unknown_id_rejected() {
        let (registry, ids) = registry_with(1);
        let ghost = Uuid::new_v4();
        let mut graph = ConnectionGraph::new();

        assert_eq!(
            graph.toggle(&registry, ids[0], ghost),
            Err(BoardError::UnknownNodeId(ghost))
        );
        assert!(graph.is_empty());
    }

    #[test]
    fn test_connections_of_and_remove_all_for() {
        let (registry, ids) = registry_with(3);
        let mut graph = ConnectionGraph::new();
        graph.toggle(&registry, ids[0], ids[1]).unwrap();
        graph.toggle(&registry, ids[2], ids[1]).unwrap();
        graph.toggle(&registry, ids[0], ids[2]).unwrap();

        assert_eq!(
            graph.connections_of(ids[1]),
            BTreeSet::from([ids[0], ids[2]])
        );

        let removed = graph.remove_all_for(ids[1]);
        assert_eq!(removed.len(), 2);
        assert!(graph.connections_of(ids[1]).is_empty());
        assert!(graph.iter().all(|pair| !pair.touches(ids[1])));
        assert_eq!(graph.len(), 1);
    }

    fn check_toggle_twice_is_identity(
        seed: Vec<(usize, usize)>,
        a: usize,
        b: usize,
    ) -> Result<(), TestCaseError> {
        let (registry, ids) = registry_with(5);
        let mut graph = ConnectionGraph::new();
        for (x, y) in seed {
            let _ = graph.toggle(&registry, ids[x], ids[y]);
        }
        let before = graph.clone();

        let first = graph.toggle(&registry, ids[a], ids[b]);
        let second = graph.toggle(&registry, ids[a], ids[b]);

        prop_assert_eq!(first.is_ok(), second.is_ok());
        prop_assert_eq!(graph, before);
        Ok(())
    }

    fn check_toggle_is_symmetric(
        seed: Vec<(usize, usize)>,
        a: usize,
        b: usize,
    ) -> Result<(), TestCaseError> {
        let (registry, ids) = registry_with(5);
        let mut graph = ConnectionGraph::new();
        for (x, y) in seed {
            let _ = graph.toggle(&registry, ids[x], ids[y]);
        }
        let mut forward = graph.clone();
        let mut backward = graph;

        let _ = forward.toggle(&registry, ids[a], ids[b]);
        let _ = backward.toggle(&registry, ids[b], ids[a]);

        prop_assert_eq!(forward, backward);
        Ok(())
    }

    proptest! {
        #[test]
        fn toggle_twice_is_identity(
            seed in prop::collection::vec((0usize..5, 0usize..5), 0..12),
            a in 0usize..5,
            b in 0usize..5,
        ) {
            check_toggle_twice_is_identity(seed, a, b)?;
        }

        #[test]
        fn toggle_is_symmetric(
            seed in prop::collection::vec((0usize..5, 0usize..5), 0..12),
            a in 0usize..5,
            b in 0usize..5,
        ) {
            check_toggle_is_symmetric(seed, a, b)?;
        }
    }
}

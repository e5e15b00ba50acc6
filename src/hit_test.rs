//! Spatial hit-testing against the node registry.

use crate::registry::NodeRegistry;
use crate::types::*;

/// Finds the topmost node under `point`.
///
/// Among all nodes whose bounds contain the point, the highest z-order wins;
/// equal z-orders resolve to the most recently inserted node. `exclude` skips
/// one node, which is how a dragged node looks "through" itself for a drop
/// target. Nothing is cached: the registry changes every frame while dragging.
pub fn hit_test(
    registry: &NodeRegistry,
    point: (f32, f32),
    exclude: Option<NodeId>,
) -> Option<&BoardNode> {
    registry
        .iter()
        .enumerate()
        .filter(|(_, node)| Some(node.id) != exclude && node.contains(point))
        .max_by_key(|(index, node)| (node.z_order, *index))
        .map(|(_, node)| node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoardNode;

    fn overlapping() -> (NodeRegistry, NodeId, NodeId) {
        let mut registry = NodeRegistry::new();
        let lower = registry.insert("a.png".into(), (0.0, 0.0), (100.0, 100.0)).unwrap().id;
        let upper = registry.insert("b.png".into(), (50.0, 50.0), (100.0, 100.0)).unwrap().id;
        (registry, lower, upper)
    }

    #[test]
    fn test_empty_canvas_returns_none() {
        let (registry, _, _) = overlapping();
        assert!(hit_test(&registry, (500.0, 500.0), None).is_none());
    }

    #[test]
    fn test_single_node_hit() {
        let (registry, lower, _) = overlapping();
        assert_eq!(hit_test(&registry, (10.0, 10.0), None).map(|n| n.id), Some(lower));
    }

    #[test]
    fn test_overlap_returns_higher_z_and_flips_after_bring_to_front() {
        let (mut registry, lower, upper) = overlapping();
        assert_eq!(hit_test(&registry, (75.0, 75.0), None).map(|n| n.id), Some(upper));

        registry.bring_to_front(lower);
        assert_eq!(hit_test(&registry, (75.0, 75.0), None).map(|n| n.id), Some(lower));
    }

    #[test]
    fn test_exclude_skips_node() {
        let (registry, lower, upper) = overlapping();
        assert_eq!(
            hit_test(&registry, (75.0, 75.0), Some(upper)).map(|n| n.id),
            Some(lower)
        );
        assert!(hit_test(&registry, (10.0, 10.0), Some(lower)).is_none());
    }

    #[test]
    fn test_equal_z_prefers_most_recent() {
        let first = BoardNode::new("a.png".into(), (0.0, 0.0), (10.0, 10.0));
        let second = BoardNode::new("b.png".into(), (0.0, 0.0), (10.0, 10.0));
        let second_id = second.id;
        let registry = NodeRegistry::from_nodes(vec![first, second]);

        assert_eq!(hit_test(&registry, (5.0, 5.0), None).map(|n| n.id), Some(second_id));
    }
}

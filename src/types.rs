//! Core data types for the image board.
//!
//! This module defines the fundamental data structures shared by the node
//! registry, connection graph, state machine and persistence layer: nodes,
//! canonical connection pairs, and the serializable board snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for board nodes.
pub type NodeId = Uuid;

/// Handle to an externally-owned image resource (usually a file path).
///
/// The core never looks inside it; only the asset collaborator resolves it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Creates a new image reference from any path-like string.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the last path component, for labels and placeholders.
    pub fn file_name(&self) -> &str {
        self.0
            .rsplit(['/', '\\'])
            .find(|part| !part.is_empty())
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageRef {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// A placed image on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardNode {
    /// Unique identifier for this node
    pub id: NodeId,
    /// The image displayed by this node
    pub image_ref: ImageRef,
    /// Top-left corner in board coordinates
    pub position: (f32, f32),
    /// Width and height in board units
    pub size: (f32, f32),
    /// Stacking order; higher values are drawn last and hit-tested first
    pub z_order: i64,
    /// Pinned nodes are skipped by the force layout
    #[serde(default)]
    pub anchored: bool,
}

impl BoardNode {
    /// Creates a new node with a fresh id at z-order zero.
    pub fn new(image_ref: ImageRef, position: (f32, f32), size: (f32, f32)) -> Self {
        Self {
            id: Uuid::new_v4(),
            image_ref,
            position,
            size,
            z_order: 0,
            anchored: false,
        }
    }

    /// Centre of the node's bounds.
    pub fn center(&self) -> (f32, f32) {
        (
            self.position.0 + self.size.0 / 2.0,
            self.position.1 + self.size.1 / 2.0,
        )
    }

    /// Whether `point` lies inside the node's axis-aligned bounds (edges inclusive).
    pub fn contains(&self, point: (f32, f32)) -> bool {
        point.0 >= self.position.0
            && point.0 <= self.position.0 + self.size.0
            && point.1 >= self.position.1
            && point.1 <= self.position.1 + self.size.1
    }

    /// Finite position and finite, non-negative size.
    pub fn is_well_formed(&self) -> bool {
        is_finite_point(self.position)
            && is_finite_point(self.size)
            && self.size.0 >= 0.0
            && self.size.1 >= 0.0
    }
}

/// Returns true when both coordinates are finite.
pub fn is_finite_point(point: (f32, f32)) -> bool {
    point.0.is_finite() && point.1.is_finite()
}

/// Canonical key of an undirected connection.
///
/// The smaller id is always stored first, so `NodePair::new(a, b)` and
/// `NodePair::new(b, a)` produce equal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodePair(NodeId, NodeId);

impl NodePair {
    /// Builds the canonical pair for `{a, b}`, or `None` for a self-loop.
    pub fn new(a: NodeId, b: NodeId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self(a, b)),
            std::cmp::Ordering::Greater => Some(Self(b, a)),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Both endpoints, smaller id first.
    pub fn ids(&self) -> (NodeId, NodeId) {
        (self.0, self.1)
    }

    /// Whether `id` is one of the endpoints.
    pub fn touches(&self, id: NodeId) -> bool {
        self.0 == id || self.1 == id
    }

    /// The endpoint opposite `id`, if `id` is an endpoint.
    pub fn other(&self, id: NodeId) -> Option<NodeId> {
        if self.0 == id {
            Some(self.1)
        } else if self.1 == id {
            Some(self.0)
        } else {
            None
        }
    }
}

/// Serializable snapshot of a whole board.
///
/// This is the exchange shape with the persistence collaborator:
/// `{ nodes: [...], connections: [[a, b], ...] }`. Connections are kept raw
/// here and validated on restore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardState {
    /// Every node, in insertion order
    pub nodes: Vec<BoardNode>,
    /// Every connection as a two-element id list
    pub connections: Vec<[NodeId; 2]>,
}

impl BoardState {
    /// Serialize the snapshot to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a snapshot from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A connection resolved to endpoint centres, ready for line drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionSegment {
    /// The canonical pair this segment draws
    pub pair: NodePair,
    /// Centre of the first endpoint
    pub from: (f32, f32),
    /// Centre of the second endpoint
    pub to: (f32, f32),
}

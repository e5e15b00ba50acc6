//! Error types for board operations.
//!
//! Every error here is local and recoverable: the worst observable outcome of
//! a rejected operation is a no-op gesture.

use thiserror::Error;

use crate::types::NodeId;

/// Errors reported by the board core and the asset collaborator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoardError {
    /// An operation referenced a node that does not exist (it may have been
    /// deleted while a drag was in flight).
    #[error("unknown node id: {0}")]
    UnknownNodeId(NodeId),

    /// A connection toggle named the same node at both ends.
    #[error("cannot connect node {0} to itself")]
    SelfConnection(NodeId),

    /// A persisted board state was rejected; the in-memory board is unchanged.
    #[error("malformed board state: {0}")]
    MalformedState(String),

    /// The image behind a node could not be resolved.
    #[error("missing asset: {0}")]
    MissingAsset(String),
}

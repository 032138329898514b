//! Error types for graph and similarity operations.

use neighborsim_core::{CoreError, EntityId, NodeId};
use thiserror::Error;

use crate::graph::Direction;

/// Errors that can occur in graph and similarity operations.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A configuration value is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The similarity computation does not support the traversal direction.
    #[error("direction {0:?} is not supported by node similarity; use Outgoing or Incoming")]
    UnsupportedDirection(Direction),

    /// The graph cannot back the requested operation.
    #[error("graph representation '{representation}' does not provide an id mapping; {operation} requires one")]
    IncompatibleGraph {
        /// Name of the graph representation that was supplied.
        representation: &'static str,
        /// The operation that needed the mapping.
        operation: &'static str,
    },

    /// Referenced entity does not exist when creating an edge.
    #[error("referenced entity does not exist: {0}")]
    InvalidEntityReference(EntityId),

    /// A relationship weight is negative or not finite.
    #[error("relationship weight must be finite and non-negative, got {0}")]
    InvalidWeight(f64),

    /// An entity with the given ID already exists.
    #[error("entity already exists: {0}")]
    EntityAlreadyExists(EntityId),

    /// A node id lies outside the graph.
    #[error("node {node} is out of range for a graph of {node_count} nodes")]
    NodeOutOfRange {
        /// The offending node.
        node: NodeId,
        /// Number of nodes in the graph.
        node_count: usize,
    },

    /// The graph has more nodes than the dense id space can address.
    #[error("graph has {0} nodes, more than the dense id space can address")]
    TooManyNodes(usize),

    /// The computation was cancelled.
    #[error("computation was cancelled")]
    Cancelled,

    /// The worker pool could not be created.
    #[error("failed to create worker pool: {0}")]
    ThreadPool(String),

    /// An error from the core crate.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

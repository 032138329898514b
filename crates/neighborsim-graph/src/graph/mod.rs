//! The host graph interface.
//!
//! The similarity engine only reads graphs through the [`Graph`] trait. It
//! works entirely in the dense [`NodeId`] space and translates to the
//! host's [`EntityId`]s only when producing output.
//!
//! # Direction
//!
//! Relationship iteration supports three directions:
//!
//! - [`Direction::Outgoing`] - Follow edges from source to target
//! - [`Direction::Incoming`] - Follow edges from target to source
//! - [`Direction::Both`] - Follow edges in both directions
//!
//! # Representations
//!
//! - [`CsrGraph`] - Compressed adjacency built with [`CsrGraphBuilder`]
//! - [`SimilarityGraph`](crate::similarity::SimilarityGraph) - Weighted
//!   result graph produced by the materializer

mod csr;
mod id_map;

use std::sync::Arc;

use neighborsim_core::{EntityId, NodeId};
use serde::{Deserialize, Serialize};

pub(crate) use csr::Adjacency;
pub use csr::{CsrGraph, CsrGraphBuilder};
pub use id_map::IdMap;

/// Weight reported for relationships of graphs that carry no weights.
pub const DEFAULT_RELATIONSHIP_WEIGHT: f64 = 1.0;

/// Direction for relationship iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Follow outgoing edges (source -> target).
    #[default]
    Outgoing,

    /// Follow incoming edges (target <- source).
    Incoming,

    /// Follow edges in both directions.
    Both,
}

impl Direction {
    /// Returns true if this direction includes outgoing edges.
    #[inline]
    pub const fn includes_outgoing(self) -> bool {
        matches!(self, Self::Outgoing | Self::Both)
    }

    /// Returns true if this direction includes incoming edges.
    #[inline]
    pub const fn includes_incoming(self) -> bool {
        matches!(self, Self::Incoming | Self::Both)
    }
}

/// Read access to a graph in the dense node id space.
///
/// Implementations must be shareable across worker threads.
pub trait Graph: Sync {
    /// Total number of nodes. Node ids are `0..node_count()`.
    fn node_count(&self) -> usize;

    /// Number of relationships of `node` along `direction`, parallel edges
    /// and self loops included.
    fn degree(&self, node: NodeId, direction: Direction) -> usize;

    /// Visit every node id in ascending order until the visitor returns
    /// `false`.
    fn for_each_node(&self, visitor: &mut dyn FnMut(NodeId) -> bool);

    /// Visit the relationships of `node` along `direction` as
    /// `(node, other)` pairs until the consumer returns `false`.
    ///
    /// With [`Direction::Both`] outgoing relationships are visited first.
    fn for_each_relationship(
        &self,
        node: NodeId,
        direction: Direction,
        consumer: &mut dyn FnMut(NodeId, NodeId) -> bool,
    );

    /// Like [`Graph::for_each_relationship`], with the weight of each
    /// relationship. Visits relationships in the same order.
    ///
    /// The default reports [`DEFAULT_RELATIONSHIP_WEIGHT`] for every
    /// relationship.
    fn for_each_weighted_relationship(
        &self,
        node: NodeId,
        direction: Direction,
        consumer: &mut dyn FnMut(NodeId, NodeId, f64) -> bool,
    ) {
        self.for_each_relationship(node, direction, &mut |source, target| {
            consumer(source, target, DEFAULT_RELATIONSHIP_WEIGHT)
        });
    }

    /// Name of the relationship property that
    /// [`Graph::for_each_weighted_relationship`] reports, if the graph
    /// carries one.
    fn relationship_weight_property(&self) -> Option<&str> {
        None
    }

    /// Translate a dense id to the host's original id.
    ///
    /// Only ids in `0..node_count()` have an original.
    fn to_original_node_id(&self, node: NodeId) -> EntityId;

    /// The id mapping backing this graph, if the representation keeps one.
    ///
    /// Building a [`SimilarityGraph`](crate::similarity::SimilarityGraph)
    /// requires it.
    fn id_map(&self) -> Option<&Arc<IdMap>> {
        None
    }

    /// Whether [`Graph::for_each_relationship`] visits neighbors in
    /// ascending id order for a single direction.
    fn has_sorted_adjacency(&self) -> bool {
        true
    }

    /// Short name of the representation, used in error messages.
    fn representation(&self) -> &'static str;
}

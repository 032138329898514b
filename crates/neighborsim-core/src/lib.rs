//! `neighborsim` Core
//!
//! This crate provides the shared types and the bounded ranked collections
//! used by the neighborhood similarity engine in `neighborsim-graph`.
//!
//! # Overview
//!
//! - **Identifiers**: [`NodeId`] for the dense internal id space and
//!   [`EntityId`] for the host graph's original ids
//! - **Results**: [`SimilarityResult`] for a scored pair of nodes
//! - **Ordering**: [`RankOrder`] selects whether the highest or the lowest
//!   priorities are retained
//! - **Collections**: [`BoundedRankedList`], [`BoundedRankedHeap`],
//!   [`RankedBuffer`] and [`PerEntityTopKTable`]
//!
//! # Example
//!
//! ```
//! use neighborsim_core::{BoundedRankedList, NodeId, RankOrder};
//!
//! // Keep the two highest priorities seen
//! let mut best = BoundedRankedList::new(2, RankOrder::Descending);
//! best.offer(NodeId::new(1), 0.2);
//! best.offer(NodeId::new(2), 0.9);
//! best.offer(NodeId::new(3), 0.5);
//!
//! let keys: Vec<_> = best.keys().collect();
//! assert_eq!(keys, vec![NodeId::new(2), NodeId::new(3)]);
//! ```
//!
//! # Modules
//!
//! - [`types`] - Identifiers, similarity results and rank orders
//! - [`collections`] - Fixed-capacity ranked containers
//! - [`error`] - Error types ([`CoreError`])

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod collections;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use collections::{
    BoundedPairList, BoundedRankedHeap, BoundedRankedList, PerEntityTopKTable, RankedBuffer,
    RankedIter, TopKShard, HEAP_CAPACITY_THRESHOLD,
};
pub use error::{CoreError, CoreResult};
pub use types::{EntityId, NodeId, RankOrder, SimilarityResult};

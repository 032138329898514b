//! `neighborsim` Graph
//!
//! This crate computes bounded neighborhood similarity between the nodes of
//! a graph: all pairs above a cutoff, the best K partners per node, the best
//! N pairs overall, or both, without materializing the full pairwise result.
//!
//! # Modules
//!
//! - [`graph`] - The host graph interface and an in-memory CSR graph
//! - [`similarity`] - Neighbor vectors, metrics, the engine and the result graph
//! - [`error`] - Error types ([`GraphError`])
//!
//! # Example
//!
//! ```
//! use neighborsim_core::EntityId;
//! use neighborsim_graph::graph::CsrGraphBuilder;
//! use neighborsim_graph::similarity::{NodeSimilarity, NodeSimilarityConfig};
//!
//! let mut builder = CsrGraphBuilder::new();
//! for id in 1..=5 {
//!     builder.add_node(EntityId::new(id))?;
//! }
//! builder.add_edge(EntityId::new(1), EntityId::new(4))?;
//! builder.add_edge(EntityId::new(1), EntityId::new(5))?;
//! builder.add_edge(EntityId::new(2), EntityId::new(4))?;
//! let graph = builder.build()?;
//!
//! let config = NodeSimilarityConfig::new().with_top_k(1);
//! let results = NodeSimilarity::new(&graph, config)?.compute_to_stream()?.collect_all()?;
//! assert_eq!(results.len(), 2);
//! # Ok::<(), neighborsim_graph::GraphError>(())
//! ```

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod graph;
pub mod similarity;

pub use error::{GraphError, GraphResult};

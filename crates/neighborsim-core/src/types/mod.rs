//! Core data types for `neighborsim`.
//!
//! This module defines the identifiers, result records and ordering
//! primitives shared by the collections and the similarity engine.

mod id;
mod order;
mod similarity;

pub use id::{EntityId, NodeId};
pub use order::RankOrder;
pub use similarity::SimilarityResult;

//! Similarity result records.

use serde::{Deserialize, Serialize};

use super::NodeId;

/// A similarity score between two nodes.
///
/// Ids are in the dense internal id space. Depending on the compute mode a
/// pair may be reported in one or both orientations.
///
/// # Example
///
/// ```
/// use neighborsim_core::{NodeId, SimilarityResult};
///
/// let result = SimilarityResult::new(NodeId::new(0), NodeId::new(3), 0.75);
/// assert_eq!(result.reversed().source, NodeId::new(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    /// The node the score is reported for.
    pub source: NodeId,
    /// The node it was compared against.
    pub target: NodeId,
    /// The similarity score, in `[0, 1]` for the built-in metrics.
    pub similarity: f64,
}

impl SimilarityResult {
    /// Create a new similarity result.
    #[inline]
    #[must_use]
    pub const fn new(source: NodeId, target: NodeId, similarity: f64) -> Self {
        Self { source, target, similarity }
    }

    /// The same score in the opposite orientation.
    #[inline]
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self { source: self.target, target: self.source, similarity: self.similarity }
    }
}

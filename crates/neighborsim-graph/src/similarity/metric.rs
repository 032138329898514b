//! Set similarity over sorted neighbor vectors.
//!
//! Every function here expects its inputs sorted ascending and free of
//! duplicates, which is what [`NeighborVectors`](super::NeighborVectors)
//! produces. Under that precondition the intersection is a single linear
//! merge and no temporary sets are allocated.
//!
//! The weighted variants take a weight slice parallel to each vector. With
//! every weight at 1.0 they agree with their unweighted counterparts.

use std::cmp::Ordering;

use neighborsim_core::NodeId;
use serde::{Deserialize, Serialize};

/// Similarity measure between two neighbor sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SimilarityMetric {
    /// Jaccard coefficient: |A ∩ B| / |A ∪ B|
    #[default]
    Jaccard,
    /// Overlap coefficient: |A ∩ B| / min(|A|, |B|)
    Overlap,
    /// Cosine similarity: |A ∩ B| / sqrt(|A| * |B|)
    Cosine,
}

impl SimilarityMetric {
    /// Score two sorted neighbor vectors.
    ///
    /// Returns 0.0 when either side is empty.
    #[must_use]
    pub fn compute(self, a: &[NodeId], b: &[NodeId]) -> f64 {
        match self {
            Self::Jaccard => jaccard(a, b),
            Self::Overlap => overlap(a, b),
            Self::Cosine => cosine(a, b),
        }
    }

    /// Score two sorted neighbor vectors, keeping the score only if it is at
    /// least `cutoff`.
    #[inline]
    #[must_use]
    pub fn compute_with_cutoff(self, a: &[NodeId], b: &[NodeId], cutoff: f64) -> Option<f64> {
        let similarity = self.compute(a, b);
        (similarity >= cutoff).then_some(similarity)
    }

    /// Score two sorted neighbor vectors with parallel weight slices.
    ///
    /// Returns 0.0 when either side is empty or carries no weight.
    #[must_use]
    pub fn compute_weighted(
        self,
        a: &[NodeId],
        weights_a: &[f64],
        b: &[NodeId],
        weights_b: &[f64],
    ) -> f64 {
        match self {
            Self::Jaccard => weighted_jaccard(a, weights_a, b, weights_b),
            Self::Overlap => weighted_overlap(a, weights_a, b, weights_b),
            Self::Cosine => weighted_cosine(a, weights_a, b, weights_b),
        }
    }

    /// Weighted score, kept only if it is at least `cutoff`.
    #[inline]
    #[must_use]
    pub fn compute_weighted_with_cutoff(
        self,
        a: &[NodeId],
        weights_a: &[f64],
        b: &[NodeId],
        weights_b: &[f64],
        cutoff: f64,
    ) -> Option<f64> {
        let similarity = self.compute_weighted(a, weights_a, b, weights_b);
        (similarity >= cutoff).then_some(similarity)
    }
}

/// Size of the intersection of two sorted, duplicate-free vectors.
#[must_use]
pub fn intersection_count(a: &[NodeId], b: &[NodeId]) -> usize {
    let (mut i, mut j, mut count) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }
    count
}

/// Jaccard coefficient of two sorted neighbor vectors.
#[must_use]
pub fn jaccard(a: &[NodeId], b: &[NodeId]) -> f64 {
    let intersection = intersection_count(a, b);
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Overlap coefficient of two sorted neighbor vectors.
#[must_use]
pub fn overlap(a: &[NodeId], b: &[NodeId]) -> f64 {
    let min_size = a.len().min(b.len());
    if min_size == 0 {
        0.0
    } else {
        intersection_count(a, b) as f64 / min_size as f64
    }
}

/// Cosine similarity of two sorted neighbor vectors, treated as binary
/// vectors.
#[must_use]
pub fn cosine(a: &[NodeId], b: &[NodeId]) -> f64 {
    let product = a.len() * b.len();
    if product == 0 {
        0.0
    } else {
        intersection_count(a, b) as f64 / (product as f64).sqrt()
    }
}

/// Sums gathered by one merge of two weighted vectors.
#[derive(Debug, Default, Clone, Copy)]
struct WeightedMerge {
    /// Sum of `min(wa, wb)` over shared neighbors.
    min: f64,
    /// Sum of `max(wa, wb)` over all neighbors, a missing side counting 0.
    max: f64,
    /// Sum of `wa * wb` over shared neighbors.
    dot: f64,
}

fn merge_weighted(
    a: &[NodeId],
    weights_a: &[f64],
    b: &[NodeId],
    weights_b: &[f64],
) -> WeightedMerge {
    debug_assert_eq!(a.len(), weights_a.len());
    debug_assert_eq!(b.len(), weights_b.len());

    let mut merge = WeightedMerge::default();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Less => {
                merge.max += weights_a[i];
                i += 1;
            }
            Ordering::Greater => {
                merge.max += weights_b[j];
                j += 1;
            }
            Ordering::Equal => {
                let (wa, wb) = (weights_a[i], weights_b[j]);
                merge.min += wa.min(wb);
                merge.max += wa.max(wb);
                merge.dot += wa * wb;
                i += 1;
                j += 1;
            }
        }
    }
    merge.max += weights_a[i..].iter().sum::<f64>() + weights_b[j..].iter().sum::<f64>();
    merge
}

/// Weighted Jaccard: the sum of the smaller weight over shared neighbors,
/// divided by the sum of the larger weight over all neighbors.
#[must_use]
pub fn weighted_jaccard(a: &[NodeId], weights_a: &[f64], b: &[NodeId], weights_b: &[f64]) -> f64 {
    let merge = merge_weighted(a, weights_a, b, weights_b);
    if merge.max > 0.0 {
        merge.min / merge.max
    } else {
        0.0
    }
}

/// Weighted overlap: the sum of the smaller weight over shared neighbors,
/// divided by the smaller of the two total weights.
#[must_use]
pub fn weighted_overlap(a: &[NodeId], weights_a: &[f64], b: &[NodeId], weights_b: &[f64]) -> f64 {
    let total = weights_a.iter().sum::<f64>().min(weights_b.iter().sum::<f64>());
    if total > 0.0 {
        merge_weighted(a, weights_a, b, weights_b).min / total
    } else {
        0.0
    }
}

/// Cosine similarity of two weighted neighbor vectors.
#[must_use]
pub fn weighted_cosine(a: &[NodeId], weights_a: &[f64], b: &[NodeId], weights_b: &[f64]) -> f64 {
    let squared = |weights: &[f64]| weights.iter().map(|w| w * w).sum::<f64>();
    let norms = squared(weights_a) * squared(weights_b);
    if norms > 0.0 {
        // Rounding can push a parallel pair a hair above 1
        (merge_weighted(a, weights_a, b, weights_b).dot / norms.sqrt()).min(1.0)
    } else {
        0.0
    }
}

//! Configuration for node similarity.

use serde::{Deserialize, Serialize};

use super::SimilarityMetric;
use crate::error::{GraphError, GraphResult};
use crate::graph::Direction;

/// Default number of consecutive source nodes handed to a worker at once.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Default lower bound on the number of distinct neighbors.
pub const DEFAULT_DEGREE_CUTOFF: usize = 1;

/// The shape of output a configuration asks for.
///
/// Selected once from whether `top_k` and `top_n` are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComputeMode {
    /// Every unordered candidate pair passing the cutoff.
    AllPairs,
    /// The best `|top_k|` partners of every candidate.
    TopK,
    /// The best `|top_n|` pairs overall.
    TopN,
    /// The best `|top_n|` pairs drawn from every candidate's top `|top_k|`.
    TopKTopN,
}

impl ComputeMode {
    /// Returns true if the mode keeps a per-node top-k table.
    #[inline]
    #[must_use]
    pub const fn uses_top_k(self) -> bool {
        matches!(self, Self::TopK | Self::TopKTopN)
    }

    /// Returns true if the mode keeps a global top-n buffer.
    #[inline]
    #[must_use]
    pub const fn uses_top_n(self) -> bool {
        matches!(self, Self::TopN | Self::TopKTopN)
    }
}

/// Configuration for [`NodeSimilarity`](super::NodeSimilarity).
///
/// Deserializes from camelCase keys (`similarityCutoff`, `degreeCutoff`,
/// `topK`, ...). Keys that are absent take their default; unknown keys are
/// rejected.
///
/// `top_k` and `top_n` are signed: the magnitude is the bound, a negative
/// value keeps the lowest similarities instead of the highest, and zero
/// disables the bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct NodeSimilarityConfig {
    /// Which relationships define a node's neighborhood.
    pub direction: Direction,
    /// The similarity measure.
    pub metric: SimilarityMetric,
    /// Pairs scoring below this are dropped. Inclusive.
    pub similarity_cutoff: f64,
    /// Nodes with fewer distinct neighbors do not participate.
    pub degree_cutoff: usize,
    /// Nodes with more distinct neighbors do not participate.
    pub upper_degree_cutoff: Option<usize>,
    /// Per-node bound on reported partners.
    pub top_k: i64,
    /// Global bound on reported pairs.
    pub top_n: i64,
    /// Number of worker threads.
    pub concurrency: usize,
    /// Consecutive source nodes per unit of parallel work.
    pub batch_size: usize,
    /// Relationship property to weight neighbors by. `None` scores plain
    /// neighbor sets.
    pub relationship_weight_property: Option<String>,
}

impl Default for NodeSimilarityConfig {
    fn default() -> Self {
        Self {
            direction: Direction::Outgoing,
            metric: SimilarityMetric::Jaccard,
            similarity_cutoff: 0.0,
            degree_cutoff: DEFAULT_DEGREE_CUTOFF,
            upper_degree_cutoff: None,
            top_k: 0,
            top_n: 0,
            concurrency: 1,
            batch_size: DEFAULT_BATCH_SIZE,
            relationship_weight_property: None,
        }
    }
}

impl NodeSimilarityConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the direction that defines neighborhoods.
    #[must_use]
    pub const fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the similarity metric.
    #[must_use]
    pub const fn with_metric(mut self, metric: SimilarityMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Set the similarity cutoff.
    #[must_use]
    pub const fn with_similarity_cutoff(mut self, cutoff: f64) -> Self {
        self.similarity_cutoff = cutoff;
        self
    }

    /// Set the lower degree cutoff.
    #[must_use]
    pub const fn with_degree_cutoff(mut self, cutoff: usize) -> Self {
        self.degree_cutoff = cutoff;
        self
    }

    /// Set the upper degree cutoff.
    #[must_use]
    pub const fn with_upper_degree_cutoff(mut self, cutoff: usize) -> Self {
        self.upper_degree_cutoff = Some(cutoff);
        self
    }

    /// Set the per-node bound. Negative values keep the lowest scores.
    #[must_use]
    pub const fn with_top_k(mut self, top_k: i64) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the global bound. Negative values keep the lowest scores.
    #[must_use]
    pub const fn with_top_n(mut self, top_n: i64) -> Self {
        self.top_n = top_n;
        self
    }

    /// Set the number of worker threads.
    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the batch size.
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Weight neighbors by the named relationship property.
    #[must_use]
    pub fn with_relationship_weight_property(mut self, property: impl Into<String>) -> Self {
        self.relationship_weight_property = Some(property.into());
        self
    }

    /// Returns true if neighbors are weighted.
    #[must_use]
    pub const fn is_weighted(&self) -> bool {
        self.relationship_weight_property.is_some()
    }

    /// The computation shape this configuration selects.
    #[must_use]
    pub const fn mode(&self) -> ComputeMode {
        match (self.top_k != 0, self.top_n != 0) {
            (false, false) => ComputeMode::AllPairs,
            (true, false) => ComputeMode::TopK,
            (false, true) => ComputeMode::TopN,
            (true, true) => ComputeMode::TopKTopN,
        }
    }

    /// Returns true if work is spread over more than one thread.
    #[must_use]
    pub const fn is_parallel(&self) -> bool {
        self.concurrency > 1
    }

    /// Check every value against its allowed range.
    pub fn validate(&self) -> GraphResult<()> {
        if self.direction == Direction::Both {
            return Err(GraphError::UnsupportedDirection(self.direction));
        }
        if self.similarity_cutoff.is_nan() || !(0.0..=1.0).contains(&self.similarity_cutoff) {
            return Err(GraphError::InvalidConfig(format!(
                "similarityCutoff must be within [0, 1], got {}",
                self.similarity_cutoff
            )));
        }
        if self.degree_cutoff == 0 {
            return Err(GraphError::InvalidConfig("degreeCutoff must be at least 1".to_owned()));
        }
        if let Some(upper) = self.upper_degree_cutoff {
            if upper < self.degree_cutoff {
                return Err(GraphError::InvalidConfig(format!(
                    "upperDegreeCutoff ({upper}) must not be below degreeCutoff ({})",
                    self.degree_cutoff
                )));
            }
        }
        if self.concurrency == 0 {
            return Err(GraphError::InvalidConfig("concurrency must be at least 1".to_owned()));
        }
        if self.batch_size == 0 {
            return Err(GraphError::InvalidConfig("batchSize must be at least 1".to_owned()));
        }
        if self.relationship_weight_property.as_deref().is_some_and(str::is_empty) {
            return Err(GraphError::InvalidConfig(
                "relationshipWeightProperty must not be empty".to_owned(),
            ));
        }
        Ok(())
    }
}

//! Bounded neighborhood similarity.
//!
//! Two nodes are similar when they share neighbors. This module compares
//! the neighborhoods of every pair of candidate nodes and reports either all
//! pairs above a cutoff or a bounded selection of them, without holding the
//! full pairwise result in memory.
//!
//! # Pipeline
//!
//! 1. [`NeighborVectors`] - Sorted, deduplicated neighbor lists for every
//!    node passing the [`DegreeFilter`]
//! 2. [`SimilarityMetric`] - Jaccard, overlap or cosine over two vectors
//! 3. [`NodeSimilarity`] - Selects a [`ComputeMode`] and feeds the bounded
//!    collections from `neighborsim_core`
//! 4. [`SimilarityStream`] or [`SimilarityGraph`] - The output
//!
//! # Bounds
//!
//! - `top_k` keeps the best partners per node
//! - `top_n` keeps the best pairs overall
//!
//! A negative bound keeps the lowest similarities instead of the highest.
//!
//! # Weights
//!
//! Setting `relationship_weight_property` scores neighborhoods by the
//! weights the graph reports under that property name, for example with
//! [`weighted_jaccard`].

mod config;
mod engine;
mod materialize;
mod metric;
mod neighbors;
mod pool;
mod progress;
mod stream;

pub use config::{ComputeMode, NodeSimilarityConfig, DEFAULT_BATCH_SIZE, DEFAULT_DEGREE_CUTOFF};
pub use engine::NodeSimilarity;
pub use materialize::{
    SimilarityGraph, SimilarityGraphBuilder, SimilarityGraphResult, SIMILARITY_PROPERTY,
};
pub use metric::{
    cosine, intersection_count, jaccard, overlap, weighted_cosine, weighted_jaccard,
    weighted_overlap, SimilarityMetric,
};
pub use neighbors::{DegreeFilter, NeighborVectors};
pub use pool::WorkerPool;
pub use progress::{
    nearby_power_of_two, progress_interval, CancellationToken, ProgressTracker, MAX_LOG_INTERVAL,
};
pub use stream::SimilarityStream;

//! Result streams.
//!
//! Bounded modes finish their work before the stream is handed out and
//! simply drain a vector. All-pairs mode is lazy: sequential runs compute one
//! pair per call to `next`, parallel runs compute one wave of batches (one
//! batch per worker) at a time and only buffer that wave.

use std::sync::Arc;

use neighborsim_core::{EntityId, NodeId, SimilarityResult};
use rayon::prelude::*;
use tracing::debug;

use super::progress::ProgressTracker;
use super::{ComputeMode, NeighborVectors, SimilarityMetric, WorkerPool};
use crate::error::GraphResult;
use crate::graph::Graph;

/// Metric and cutoff applied to every candidate pair. Weighted vectors are
/// scored with the metric's weighted form.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PairScorer {
    pub(crate) metric: SimilarityMetric,
    pub(crate) cutoff: f64,
}

impl PairScorer {
    #[inline]
    pub(crate) fn score(
        self,
        vectors: &NeighborVectors,
        source: NodeId,
        target: NodeId,
    ) -> Option<f64> {
        let (a, b) = (vectors.vector(source), vectors.vector(target));
        match (vectors.weights(source), vectors.weights(target)) {
            (Some(weights_a), Some(weights_b)) => {
                self.metric.compute_weighted_with_cutoff(a, weights_a, b, weights_b, self.cutoff)
            }
            _ => self.metric.compute_with_cutoff(a, b, self.cutoff),
        }
    }
}

/// Single-pass stream of similarity results.
///
/// Yields `Err(GraphError::Cancelled)` once and then ends if the
/// computation is cancelled while the stream is being consumed.
#[derive(Debug)]
pub struct SimilarityStream {
    mode: ComputeMode,
    nodes_compared: usize,
    source: Source,
}

#[derive(Debug)]
enum Source {
    Computed(std::vec::IntoIter<SimilarityResult>),
    Pairs(PairCursor),
    Waves(WaveCursor),
}

impl SimilarityStream {
    pub(crate) fn computed(
        mode: ComputeMode,
        nodes_compared: usize,
        results: Vec<SimilarityResult>,
    ) -> Self {
        Self { mode, nodes_compared, source: Source::Computed(results.into_iter()) }
    }

    pub(crate) fn all_pairs(
        vectors: Arc<NeighborVectors>,
        scorer: PairScorer,
        progress: ProgressTracker,
    ) -> Self {
        let nodes_compared = vectors.candidate_count();
        let cursor = PairCursor { vectors, scorer, progress, source: 0, target: 0, finished: false };
        Self { mode: ComputeMode::AllPairs, nodes_compared, source: Source::Pairs(cursor) }
    }

    pub(crate) fn all_pairs_parallel(
        vectors: Arc<NeighborVectors>,
        scorer: PairScorer,
        progress: ProgressTracker,
        pool: WorkerPool,
        batch_size: usize,
    ) -> Self {
        let nodes_compared = vectors.candidate_count();
        let cursor = WaveCursor {
            vectors,
            scorer,
            progress,
            pool,
            batch_size,
            next: 0,
            buffer: Vec::new().into_iter(),
        };
        Self { mode: ComputeMode::AllPairs, nodes_compared, source: Source::Waves(cursor) }
    }

    /// Number of candidate nodes taking part in the comparison.
    #[must_use]
    pub const fn nodes_compared(&self) -> usize {
        self.nodes_compared
    }

    /// The mode that produced this stream.
    #[must_use]
    pub const fn mode(&self) -> ComputeMode {
        self.mode
    }

    /// Drain the stream, failing on the first error.
    pub fn collect_all(self) -> GraphResult<Vec<SimilarityResult>> {
        self.collect()
    }

    /// Translate node ids to `graph`'s original ids as results are consumed.
    pub fn into_original<G: Graph + ?Sized>(
        self,
        graph: &G,
    ) -> impl Iterator<Item = GraphResult<(EntityId, EntityId, f64)>> + '_ {
        self.map(move |result| {
            result.map(|r| {
                (graph.to_original_node_id(r.source), graph.to_original_node_id(r.target), r.similarity)
            })
        })
    }
}

impl Iterator for SimilarityStream {
    type Item = GraphResult<SimilarityResult>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.source {
            Source::Computed(results) => results.next().map(Ok),
            Source::Pairs(cursor) => cursor.next(),
            Source::Waves(cursor) => cursor.next(),
        }
    }
}

/// Lazy walk over candidate pairs `(i, j)`, `i < j`, on the calling thread.
#[derive(Debug)]
struct PairCursor {
    vectors: Arc<NeighborVectors>,
    scorer: PairScorer,
    progress: ProgressTracker,
    /// Position of the current source in the candidate list.
    source: usize,
    /// Position of the next target, or 0 before the source was started.
    target: usize,
    finished: bool,
}

impl PairCursor {
    fn next(&mut self) -> Option<GraphResult<SimilarityResult>> {
        let candidates = self.vectors.candidates();
        while self.source < candidates.len() {
            let source = candidates[self.source];
            if self.target == 0 {
                if let Err(e) = self.progress.check(source) {
                    self.source = candidates.len();
                    self.finished = true;
                    return Some(Err(e));
                }
                self.target = self.source + 1;
            }
            while self.target < candidates.len() {
                let target = candidates[self.target];
                self.target += 1;
                if let Some(similarity) = self.scorer.score(&self.vectors, source, target) {
                    return Some(Ok(SimilarityResult::new(source, target, similarity)));
                }
            }
            self.source += 1;
            self.target = 0;
        }
        if !self.finished {
            self.finished = true;
            self.progress.finish();
        }
        None
    }
}

/// Lazy all-pairs walk that computes one wave of batches at a time on a
/// worker pool.
#[derive(Debug)]
struct WaveCursor {
    vectors: Arc<NeighborVectors>,
    scorer: PairScorer,
    progress: ProgressTracker,
    pool: WorkerPool,
    batch_size: usize,
    /// Candidate position where the next wave starts.
    next: usize,
    buffer: std::vec::IntoIter<SimilarityResult>,
}

impl WaveCursor {
    fn next(&mut self) -> Option<GraphResult<SimilarityResult>> {
        loop {
            if let Some(result) = self.buffer.next() {
                return Some(Ok(result));
            }
            let candidate_count = self.vectors.candidate_count();
            if self.next >= candidate_count {
                return None;
            }
            match self.compute_wave() {
                Ok(results) => self.buffer = results.into_iter(),
                Err(e) => {
                    self.next = candidate_count;
                    return Some(Err(e));
                }
            }
            if self.next >= candidate_count {
                self.progress.finish();
            }
        }
    }

    fn compute_wave(&mut self) -> GraphResult<Vec<SimilarityResult>> {
        self.progress.ensure_running()?;
        let candidates = self.vectors.candidates();
        let start = self.next;
        let end = (start + self.batch_size * self.pool.concurrency()).min(candidates.len());
        self.next = end;

        let vectors = &*self.vectors;
        let scorer = self.scorer;
        let progress = &self.progress;
        let batches: Vec<(usize, usize)> = (start..end)
            .step_by(self.batch_size)
            .map(|from| (from, (from + self.batch_size).min(end)))
            .collect();
        debug!(start, end, batches = batches.len(), "computing all-pairs wave");

        let per_batch = self.pool.install(|| {
            batches
                .into_par_iter()
                .map(|(from, to)| {
                    let mut results = Vec::new();
                    for position in from..to {
                        let source = candidates[position];
                        progress.check(source)?;
                        for &target in &candidates[position + 1..] {
                            if let Some(similarity) = scorer.score(vectors, source, target) {
                                results.push(SimilarityResult::new(source, target, similarity));
                            }
                        }
                    }
                    Ok(results)
                })
                .collect::<GraphResult<Vec<_>>>()
        })?;

        Ok(per_batch.into_iter().flatten().collect())
    }
}

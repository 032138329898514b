//! The node similarity engine.

use std::sync::Arc;

use neighborsim_core::{NodeId, PerEntityTopKTable, RankOrder, RankedBuffer, SimilarityResult};
use rayon::prelude::*;
use tracing::{debug, info};

use super::materialize::{SimilarityGraphBuilder, SimilarityGraphResult};
use super::progress::{CancellationToken, ProgressTracker};
use super::stream::PairScorer;
use super::{
    ComputeMode, DegreeFilter, NeighborVectors, NodeSimilarityConfig, SimilarityStream,
    WorkerPool,
};
use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;

/// Bounded neighborhood similarity over a [`Graph`].
///
/// Which pairs are reported depends on the configuration's
/// [`ComputeMode`]:
///
/// - `AllPairs`: every unordered candidate pair `(i, j)`, `i < j`, scoring
///   at least the cutoff, produced lazily
/// - `TopK`: for every candidate its `|top_k|` best partners, both
///   orientations of a pair reported independently
/// - `TopN`: the `|top_n|` best unordered pairs overall
/// - `TopKTopN`: the `|top_n|` best entries across all top-k lists
///
/// # Example
///
/// ```
/// use neighborsim_core::EntityId;
/// use neighborsim_graph::graph::CsrGraphBuilder;
/// use neighborsim_graph::similarity::{NodeSimilarity, NodeSimilarityConfig};
///
/// let mut builder = CsrGraphBuilder::new();
/// for id in 0..4 {
///     builder.add_node(EntityId::new(id))?;
/// }
/// builder.add_edge(EntityId::new(0), EntityId::new(2))?;
/// builder.add_edge(EntityId::new(1), EntityId::new(2))?;
/// builder.add_edge(EntityId::new(1), EntityId::new(3))?;
/// let graph = builder.build()?;
///
/// let config = NodeSimilarityConfig::new().with_top_n(1);
/// let results = NodeSimilarity::new(&graph, config)?.compute_to_stream()?.collect_all()?;
/// assert_eq!(results.len(), 1);
/// assert!((results[0].similarity - 0.5).abs() < 1e-12);
/// # Ok::<(), neighborsim_graph::GraphError>(())
/// ```
pub struct NodeSimilarity<'g, G: Graph + ?Sized> {
    graph: &'g G,
    config: NodeSimilarityConfig,
    token: CancellationToken,
}

impl<'g, G: Graph + ?Sized> NodeSimilarity<'g, G> {
    /// Create an engine over `graph`, validating `config`.
    ///
    /// A weighted configuration also requires `graph` to carry the named
    /// relationship property.
    pub fn new(graph: &'g G, config: NodeSimilarityConfig) -> GraphResult<Self> {
        config.validate()?;
        if let Some(property) = config.relationship_weight_property.as_deref() {
            if graph.relationship_weight_property() != Some(property) {
                return Err(GraphError::InvalidConfig(format!(
                    "relationshipWeightProperty '{property}' is not present on the {} graph",
                    graph.representation()
                )));
            }
        }
        Ok(Self { graph, config, token: CancellationToken::new() })
    }

    /// Attach a token that aborts the computation when cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// The validated configuration.
    #[must_use]
    pub const fn config(&self) -> &NodeSimilarityConfig {
        &self.config
    }

    /// The token observed by this engine.
    #[must_use]
    pub const fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    /// Compute similarities as a stream of results.
    ///
    /// All-pairs results are computed while the stream is consumed; the
    /// bounded modes finish before returning.
    pub fn compute_to_stream(&self) -> GraphResult<SimilarityStream> {
        let mode = self.config.mode();
        let pool = WorkerPool::new(self.config.concurrency)?;
        let vectors = self.prepare(&pool)?;
        let nodes_compared = vectors.candidate_count();
        info!(?mode, nodes_compared, concurrency = pool.concurrency(), "computing node similarity");

        let stream = match mode {
            ComputeMode::AllPairs => {
                let progress =
                    ProgressTracker::new("all pairs", nodes_compared, self.token.clone());
                let vectors = Arc::new(vectors);
                if pool.is_parallel() {
                    SimilarityStream::all_pairs_parallel(
                        vectors,
                        self.scorer(),
                        progress,
                        pool,
                        self.config.batch_size,
                    )
                } else {
                    SimilarityStream::all_pairs(vectors, self.scorer(), progress)
                }
            }
            ComputeMode::TopK => {
                let table = self.top_k_table(&vectors, &pool)?;
                SimilarityStream::computed(mode, nodes_compared, table.into_results())
            }
            ComputeMode::TopN => {
                let results = self.top_n(&vectors)?;
                SimilarityStream::computed(mode, nodes_compared, results)
            }
            ComputeMode::TopKTopN => {
                let table = self.top_k_table(&vectors, &pool)?;
                let results = self.rerank(&table);
                SimilarityStream::computed(mode, nodes_compared, results)
            }
        };
        Ok(stream)
    }

    /// Compute similarities and materialize them as a weighted graph over
    /// the input's nodes.
    ///
    /// Fails before any work is done if the input graph has no id mapping.
    pub fn compute_to_graph(&self) -> GraphResult<SimilarityGraphResult> {
        let builder = SimilarityGraphBuilder::new(self.graph)?;

        if self.config.mode() == ComputeMode::TopK {
            let pool = WorkerPool::new(self.config.concurrency)?;
            let vectors = self.prepare(&pool)?;
            let table = self.top_k_table(&vectors, &pool)?;
            let graph = builder.build_from_results(table.iter())?;
            return Ok(SimilarityGraphResult {
                graph,
                nodes_compared: vectors.candidate_count(),
                top_k_graph: true,
            });
        }

        let stream = self.compute_to_stream()?;
        let nodes_compared = stream.nodes_compared();
        let graph = builder.build(stream)?;
        Ok(SimilarityGraphResult { graph, nodes_compared, top_k_graph: false })
    }

    fn prepare(&self, pool: &WorkerPool) -> GraphResult<NeighborVectors> {
        let filter = DegreeFilter {
            lower: self.config.degree_cutoff,
            upper: self.config.upper_degree_cutoff,
        };
        NeighborVectors::build(
            self.graph,
            self.config.direction,
            filter,
            self.config.is_weighted(),
            pool,
            self.config.batch_size,
            &self.token,
        )
    }

    fn scorer(&self) -> PairScorer {
        PairScorer { metric: self.config.metric, cutoff: self.config.similarity_cutoff }
    }

    /// Fill a per-node top-k table.
    ///
    /// Sequential runs score each unordered pair once and offer both
    /// orientations. Parallel runs give each worker a shard of source nodes
    /// and score full rows, so every list has exactly one writer.
    fn top_k_table(
        &self,
        vectors: &NeighborVectors,
        pool: &WorkerPool,
    ) -> GraphResult<PerEntityTopKTable> {
        let mut table = PerEntityTopKTable::new(self.config.top_k, &vectors.participants())?;
        let candidates = vectors.candidates();
        let scorer = self.scorer();
        let progress = ProgressTracker::new("top k", candidates.len(), self.token.clone());

        if pool.is_parallel() {
            let mut shards = table.shards_mut(self.config.batch_size);
            debug!(shards = shards.len(), k = self.config.top_k, "filling top-k table in parallel");
            pool.install(|| {
                shards.par_iter_mut().try_for_each(|shard| -> GraphResult<()> {
                    for (source, list) in shard.sources_mut() {
                        progress.check(source)?;
                        for &target in candidates {
                            if target == source {
                                continue;
                            }
                            if let Some(similarity) = scorer.score(vectors, source, target) {
                                list.offer(target, similarity);
                            }
                        }
                    }
                    Ok(())
                })
            })?;
        } else {
            for (position, &source) in candidates.iter().enumerate() {
                progress.check(source)?;
                for &target in &candidates[position + 1..] {
                    if let Some(similarity) = scorer.score(vectors, source, target) {
                        table.put(source, target, similarity);
                        table.put(target, source, similarity);
                    }
                }
            }
        }

        progress.finish();
        Ok(table)
    }

    /// Global top-n over every unordered candidate pair. Always sequential.
    fn top_n(&self, vectors: &NeighborVectors) -> GraphResult<Vec<SimilarityResult>> {
        let mut buffer = self.top_n_buffer();
        let candidates = vectors.candidates();
        let scorer = self.scorer();
        let progress = ProgressTracker::new("top n", candidates.len(), self.token.clone());

        for (position, &source) in candidates.iter().enumerate() {
            progress.check(source)?;
            for &target in &candidates[position + 1..] {
                if let Some(similarity) = scorer.score(vectors, source, target) {
                    buffer.offer_pair(source, target, similarity);
                }
            }
        }

        progress.finish();
        Ok(buffer.into_results())
    }

    /// Re-rank the contents of a top-k table into the global top-n.
    fn rerank(&self, table: &PerEntityTopKTable) -> Vec<SimilarityResult> {
        let mut buffer = self.top_n_buffer();
        for result in table.iter() {
            buffer.offer_pair(result.source, result.target, result.similarity);
        }
        debug!(held = table.len(), kept = buffer.len(), "re-ranked top-k table");
        buffer.into_results()
    }

    fn top_n_buffer(&self) -> RankedBuffer<(NodeId, NodeId)> {
        let top_n = self.config.top_n;
        let capacity = usize::try_from(top_n.unsigned_abs()).unwrap_or(usize::MAX);
        RankedBuffer::new(capacity, RankOrder::from_signed(top_n))
    }
}

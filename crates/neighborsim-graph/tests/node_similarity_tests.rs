//! Integration tests for node similarity.
//!
//! Most tests run on a small bipartite graph of people and the items they
//! like, once on the calling thread and once on a worker pool.

#![allow(clippy::float_cmp)]

use std::collections::BTreeSet;
use std::sync::Arc;

use neighborsim_core::{EntityId, NodeId, SimilarityResult};
use neighborsim_graph::graph::{CsrGraph, CsrGraphBuilder, Direction, Graph, IdMap};
use neighborsim_graph::similarity::{
    progress_interval, CancellationToken, ComputeMode, NodeSimilarity, NodeSimilarityConfig,
    SimilarityMetric, SIMILARITY_PROPERTY,
};
use neighborsim_graph::GraphError;
use proptest::prelude::*;

const ALICE: u32 = 0;
const BOB: u32 = 1;
const CHARLIE: u32 = 2;
const DAVE: u32 = 3;
const ITEM_1: u32 = 4;
const ITEM_2: u32 = 5;
const ITEM_3: u32 = 6;

const EPSILON: f64 = 1e-9;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Helper functions to create test graphs
// ============================================================================

fn build_graph(node_count: u64, edges: &[(u64, u64)]) -> CsrGraph {
    let mut builder = CsrGraphBuilder::new();
    for id in 0..node_count {
        builder.add_node(EntityId::new(id)).expect("add node");
    }
    for &(source, target) in edges {
        builder.add_edge(EntityId::new(source), EntityId::new(target)).expect("add edge");
    }
    builder.build().expect("build graph")
}

/// Four people and four items:
///
/// - alice likes items 1, 2 and 3
/// - bob likes items 1 and 2
/// - charlie likes item 3
/// - dave likes items 1, 2 and 3
/// - nobody likes item 4
fn create_likes_graph() -> CsrGraph {
    let (a, b, c, d) = (0, 1, 2, 3);
    let (i1, i2, i3) = (4, 5, 6);
    build_graph(
        8,
        &[(a, i1), (a, i2), (a, i3), (b, i1), (b, i2), (c, i3), (d, i1), (d, i2), (d, i3)],
    )
}

/// 600 nodes where every odd node points at node 0.
///
/// The 300 candidates all sit on odd ids and every pair scores 1.0, so the
/// progress interval is 4 while no candidate id is a multiple of it.
fn create_odd_fan_graph() -> CsrGraph {
    let edges: Vec<(u64, u64)> = (0..300).map(|i| (2 * i + 1, 0)).collect();
    build_graph(600, &edges)
}

const ODD_FAN_PAIRS: usize = 300 * 299 / 2;

/// People rating items, with the rating as relationship weight.
fn create_ratings_graph() -> CsrGraph {
    let mut builder = CsrGraphBuilder::new().with_weight_property("rating");
    for id in 0..7 {
        builder.add_node(EntityId::new(id)).expect("add node");
    }
    let (a, b, c, d) = (0, 1, 2, 3);
    let (i1, i2, i3) = (4, 5, 6);
    for (person, item, rating) in [
        (a, i1, 5.0),
        (a, i2, 1.0),
        (b, i1, 5.0),
        (b, i2, 1.0),
        (c, i1, 1.0),
        (c, i2, 5.0),
        (d, i1, 2.0),
        (d, i3, 4.0),
    ] {
        builder
            .add_weighted_edge(EntityId::new(person), EntityId::new(item), rating)
            .expect("add edge");
    }
    builder.build().expect("build graph")
}

fn compute(graph: &CsrGraph, config: NodeSimilarityConfig) -> Vec<SimilarityResult> {
    init_tracing();
    let mut results = NodeSimilarity::new(graph, config)
        .expect("valid config")
        .compute_to_stream()
        .expect("compute")
        .collect_all()
        .expect("results");
    sort(&mut results);
    results
}

fn sort(results: &mut [SimilarityResult]) {
    results.sort_by(|a, b| (a.source, a.target).cmp(&(b.source, b.target)));
}

/// Run sequentially and on four workers, check both agree and return the
/// sorted results.
fn compute_both(graph: &CsrGraph, config: NodeSimilarityConfig) -> Vec<SimilarityResult> {
    let sequential = compute(graph, config.clone().with_concurrency(1));
    let parallel = compute(graph, config.with_concurrency(4).with_batch_size(1));
    assert_eq!(sequential, parallel, "sequential and parallel runs disagree");
    sequential
}

fn assert_results(actual: &[SimilarityResult], expected: &[(u32, u32, f64)]) {
    assert_eq!(actual.len(), expected.len(), "unexpected results: {actual:?}");
    for (result, &(source, target, similarity)) in actual.iter().zip(expected) {
        assert_eq!((result.source.as_u32(), result.target.as_u32()), (source, target));
        assert!(
            (result.similarity - similarity).abs() < EPSILON,
            "({source}, {target}): expected {similarity}, got {}",
            result.similarity
        );
    }
}

// ============================================================================
// All pairs
// ============================================================================

#[test]
fn test_all_pairs_outgoing() {
    let graph = create_likes_graph();
    let results = compute_both(&graph, NodeSimilarityConfig::new());

    assert_results(
        &results,
        &[
            (ALICE, BOB, 2.0 / 3.0),
            (ALICE, CHARLIE, 1.0 / 3.0),
            (ALICE, DAVE, 1.0),
            (BOB, CHARLIE, 0.0),
            (BOB, DAVE, 2.0 / 3.0),
            (CHARLIE, DAVE, 1.0 / 3.0),
        ],
    );
}

#[test]
fn test_all_pairs_incoming() {
    let graph = create_likes_graph();
    let results =
        compute_both(&graph, NodeSimilarityConfig::new().with_direction(Direction::Incoming));

    assert_results(&results, &[(ITEM_1, ITEM_2, 1.0), (ITEM_1, ITEM_3, 0.5), (ITEM_2, ITEM_3, 0.5)]);
}

#[test]
fn test_all_pairs_count_is_choose_two_of_candidates() {
    let edges: Vec<(u64, u64)> =
        (0..40u64).flat_map(|i| [(i, 40 + i % 7), (i, 40 + (i * 3) % 11)]).collect();
    let graph = build_graph(60, &edges);

    let results = compute_both(&graph, NodeSimilarityConfig::new());
    assert_eq!(results.len(), 40 * 39 / 2);
}

#[test]
fn test_similarity_cutoff_is_inclusive() {
    let graph = create_likes_graph();
    let results =
        compute_both(&graph, NodeSimilarityConfig::new().with_similarity_cutoff(2.0 / 3.0));

    assert_results(&results, &[(ALICE, BOB, 2.0 / 3.0), (ALICE, DAVE, 1.0), (BOB, DAVE, 2.0 / 3.0)]);
}

#[test]
fn test_degree_cutoffs() {
    let graph = create_likes_graph();

    let results = compute_both(&graph, NodeSimilarityConfig::new().with_degree_cutoff(3));
    assert_results(&results, &[(ALICE, DAVE, 1.0)]);

    let results = compute_both(&graph, NodeSimilarityConfig::new().with_upper_degree_cutoff(2));
    assert_results(&results, &[(BOB, CHARLIE, 0.0)]);
}

#[test]
fn test_other_metrics() {
    let graph = create_likes_graph();
    let results = compute_both(
        &graph,
        NodeSimilarityConfig::new().with_metric(SimilarityMetric::Overlap).with_top_n(1),
    );
    // Every pair sharing an item has an overlap of 1.0
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].similarity, 1.0);

    let results = compute_both(
        &graph,
        NodeSimilarityConfig::new()
            .with_metric(SimilarityMetric::Cosine)
            .with_similarity_cutoff(0.8),
    );
    let shared_two = 2.0 / 6.0_f64.sqrt();
    assert_results(&results, &[(ALICE, BOB, shared_two), (ALICE, DAVE, 1.0), (BOB, DAVE, shared_two)]);
}

#[test]
fn test_three_people_scenario() {
    // P1 -> {T1, T2, T3}, P2 -> {T1, T2}, P3 -> {T3}
    let graph = build_graph(6, &[(0, 3), (0, 4), (0, 5), (1, 3), (1, 4), (2, 5)]);

    let results = compute_both(&graph, NodeSimilarityConfig::new());
    assert_results(&results, &[(0, 1, 2.0 / 3.0), (0, 2, 1.0 / 3.0), (1, 2, 0.0)]);

    let results = compute_both(&graph, NodeSimilarityConfig::new().with_top_k(1));
    assert_results(&results, &[(0, 1, 2.0 / 3.0), (1, 0, 2.0 / 3.0), (2, 0, 1.0 / 3.0)]);
}

// ============================================================================
// Top-k and top-n
// ============================================================================

#[test]
fn test_top_k() {
    let graph = create_likes_graph();
    let results = compute_both(&graph, NodeSimilarityConfig::new().with_top_k(1));

    assert_results(
        &results,
        &[(ALICE, DAVE, 1.0), (BOB, ALICE, 2.0 / 3.0), (CHARLIE, ALICE, 1.0 / 3.0), (DAVE, ALICE, 1.0)],
    );
}

#[test]
fn test_bottom_k() {
    let graph = create_likes_graph();
    let results = compute_both(&graph, NodeSimilarityConfig::new().with_top_k(-1));

    assert_results(
        &results,
        &[
            (ALICE, CHARLIE, 1.0 / 3.0),
            (BOB, CHARLIE, 0.0),
            (CHARLIE, BOB, 0.0),
            (DAVE, CHARLIE, 1.0 / 3.0),
        ],
    );
}

#[test]
fn test_top_k_with_cutoff() {
    let graph = create_likes_graph();
    let results = compute_both(
        &graph,
        NodeSimilarityConfig::new().with_top_k(1).with_similarity_cutoff(0.5),
    );

    // Charlie's best partner scores 1/3 and is cut off
    assert_results(&results, &[(ALICE, DAVE, 1.0), (BOB, ALICE, 2.0 / 3.0), (DAVE, ALICE, 1.0)]);
}

#[test]
fn test_top_n() {
    let graph = create_likes_graph();

    let results = compute_both(&graph, NodeSimilarityConfig::new().with_top_n(1));
    assert_results(&results, &[(ALICE, DAVE, 1.0)]);

    let results = compute_both(&graph, NodeSimilarityConfig::new().with_top_n(-1));
    assert_results(&results, &[(BOB, CHARLIE, 0.0)]);

    let results = compute_both(&graph, NodeSimilarityConfig::new().with_top_n(100));
    assert_eq!(results.len(), 6);
}

#[test]
fn test_top_n_is_ranked_best_first() {
    let graph = create_likes_graph();
    let results = NodeSimilarity::new(&graph, NodeSimilarityConfig::new().with_top_n(3))
        .expect("valid config")
        .compute_to_stream()
        .expect("compute")
        .collect_all()
        .expect("results");

    let similarities: Vec<f64> = results.iter().map(|r| r.similarity).collect();
    assert_eq!(similarities.len(), 3);
    assert!(similarities.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(similarities[0], 1.0);
}

#[test]
fn test_top_k_then_top_n() {
    let graph = create_likes_graph();
    let results =
        compute_both(&graph, NodeSimilarityConfig::new().with_top_k(1).with_top_n(3));

    // Both orientations of alice/dave survive the re-ranking
    assert_results(&results, &[(ALICE, DAVE, 1.0), (BOB, ALICE, 2.0 / 3.0), (DAVE, ALICE, 1.0)]);
}

// ============================================================================
// Streams, cancellation and output ids
// ============================================================================

#[test]
fn test_stream_metadata() {
    let graph = create_likes_graph();
    let engine = NodeSimilarity::new(&graph, NodeSimilarityConfig::new()).expect("valid config");
    let stream = engine.compute_to_stream().expect("compute");

    assert_eq!(stream.mode(), ComputeMode::AllPairs);
    assert_eq!(stream.nodes_compared(), 4);
    assert_eq!(stream.count(), 6);
}

#[test]
fn test_cancelled_before_start() {
    let graph = create_likes_graph();
    for config in [
        NodeSimilarityConfig::new(),
        NodeSimilarityConfig::new().with_top_k(1),
        NodeSimilarityConfig::new().with_top_n(1).with_concurrency(4),
    ] {
        let token = CancellationToken::new();
        token.cancel();
        let engine =
            NodeSimilarity::new(&graph, config).expect("valid config").with_cancellation(token);
        assert!(matches!(engine.compute_to_stream(), Err(GraphError::Cancelled)));
        assert!(matches!(engine.compute_to_graph(), Err(GraphError::Cancelled)));
    }
}

#[test]
fn test_cancelled_lazy_stream_yields_single_error() {
    let graph = create_likes_graph();
    for concurrency in [1, 4] {
        let token = CancellationToken::new();
        let engine = NodeSimilarity::new(
            &graph,
            NodeSimilarityConfig::new().with_concurrency(concurrency),
        )
        .expect("valid config")
        .with_cancellation(token.clone());

        let stream = engine.compute_to_stream().expect("compute");
        token.cancel();

        let items: Vec<_> = stream.collect();
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(GraphError::Cancelled)));
    }
}

#[test]
fn test_cancel_observed_with_off_grid_candidate_ids() {
    let graph = create_odd_fan_graph();
    for concurrency in [1, 4] {
        let token = CancellationToken::new();
        let engine = NodeSimilarity::new(
            &graph,
            NodeSimilarityConfig::new().with_concurrency(concurrency).with_batch_size(10),
        )
        .expect("valid config")
        .with_cancellation(token.clone());

        let stream = engine.compute_to_stream().expect("compute");
        assert_eq!(stream.nodes_compared(), 300);
        assert_eq!(progress_interval(stream.nodes_compared()), 4);
        token.cancel();

        let items: Vec<_> = stream.collect();
        assert_eq!(items.len(), 1, "concurrency {concurrency}");
        assert!(matches!(items[0], Err(GraphError::Cancelled)));
    }
}

#[test]
fn test_cancel_mid_stream_ends_with_single_error() {
    let graph = create_odd_fan_graph();
    for concurrency in [1, 4] {
        let token = CancellationToken::new();
        let engine = NodeSimilarity::new(
            &graph,
            NodeSimilarityConfig::new().with_concurrency(concurrency).with_batch_size(10),
        )
        .expect("valid config")
        .with_cancellation(token.clone());

        let mut stream = engine.compute_to_stream().expect("compute");
        assert!(matches!(stream.next(), Some(Ok(_))));
        token.cancel();

        let rest: Vec<_> = stream.collect();
        let ok = rest.iter().filter(|item| item.is_ok()).count();
        let errors = rest.iter().filter(|item| item.is_err()).count();
        assert_eq!(errors, 1, "concurrency {concurrency}");
        assert!(matches!(rest.last(), Some(Err(GraphError::Cancelled))));
        assert!(ok + 1 < ODD_FAN_PAIRS, "concurrency {concurrency}: {ok} results after cancel");
    }

    // Sequential runs poll at least every 4 sources, each with at most 299
    // partners
    let token = CancellationToken::new();
    let engine = NodeSimilarity::new(&graph, NodeSimilarityConfig::new())
        .expect("valid config")
        .with_cancellation(token.clone());
    let mut stream = engine.compute_to_stream().expect("compute");
    assert!(stream.next().is_some());
    token.cancel();
    let ok = stream.filter(Result::is_ok).count();
    assert!(ok < 4 * 299);
}

/// Cancels a token once the neighbors of `trigger` are read.
struct CancelOnVisit {
    inner: CsrGraph,
    trigger: NodeId,
    token: CancellationToken,
}

impl Graph for CancelOnVisit {
    fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    fn degree(&self, node: NodeId, direction: Direction) -> usize {
        self.inner.degree(node, direction)
    }

    fn for_each_node(&self, visitor: &mut dyn FnMut(NodeId) -> bool) {
        self.inner.for_each_node(visitor);
    }

    fn for_each_relationship(
        &self,
        node: NodeId,
        direction: Direction,
        consumer: &mut dyn FnMut(NodeId, NodeId) -> bool,
    ) {
        if node == self.trigger {
            self.token.cancel();
        }
        self.inner.for_each_relationship(node, direction, consumer);
    }

    fn to_original_node_id(&self, node: NodeId) -> EntityId {
        self.inner.to_original_node_id(node)
    }

    fn id_map(&self) -> Option<&Arc<IdMap>> {
        self.inner.id_map()
    }

    fn representation(&self) -> &'static str {
        "cancel-on-visit"
    }
}

#[test]
fn test_cancel_during_bounded_modes_with_off_grid_ids() {
    init_tracing();
    for config in [
        NodeSimilarityConfig::new().with_top_k(5),
        NodeSimilarityConfig::new().with_top_n(5),
        NodeSimilarityConfig::new().with_top_k(5).with_top_n(5),
    ] {
        for concurrency in [1, 4] {
            let token = CancellationToken::new();
            // The last node is read last, so sequential runs finish building
            // neighbor vectors before the cancel is observed
            let graph = CancelOnVisit {
                inner: create_odd_fan_graph(),
                trigger: NodeId::new(599),
                token: token.clone(),
            };
            let engine = NodeSimilarity::new(
                &graph,
                config.clone().with_concurrency(concurrency).with_batch_size(10),
            )
            .expect("valid config")
            .with_cancellation(token);

            assert!(
                matches!(engine.compute_to_stream(), Err(GraphError::Cancelled)),
                "{config:?} at concurrency {concurrency}"
            );
        }
    }
}

#[test]
fn test_results_translate_to_original_ids() {
    let mut builder = CsrGraphBuilder::new();
    for id in [100, 200, 300] {
        builder.add_node(EntityId::new(id)).expect("add node");
    }
    builder.add_edge(EntityId::new(100), EntityId::new(300)).expect("add edge");
    builder.add_edge(EntityId::new(200), EntityId::new(300)).expect("add edge");
    let graph = builder.build().expect("build graph");

    let engine = NodeSimilarity::new(&graph, NodeSimilarityConfig::new()).expect("valid config");
    let translated: Vec<_> = engine
        .compute_to_stream()
        .expect("compute")
        .into_original(&graph)
        .collect::<Result<_, _>>()
        .expect("results");

    assert_eq!(translated, vec![(EntityId::new(100), EntityId::new(200), 1.0)]);
}

// ============================================================================
// Materialized result graph
// ============================================================================

#[test]
fn test_graph_from_all_pairs() {
    let graph = create_likes_graph();
    let engine = NodeSimilarity::new(&graph, NodeSimilarityConfig::new()).expect("valid config");
    let expected = engine.compute_to_stream().expect("compute").collect_all().expect("results");

    let result = engine.compute_to_graph().expect("graph");
    assert!(!result.top_k_graph);
    assert_eq!(result.nodes_compared, 4);
    assert_eq!(result.graph.relationship_count(), expected.len());
    assert_eq!(result.graph.node_count(), graph.node_count());
    for r in &expected {
        assert_eq!(result.graph.weight(r.source, r.target), Some(r.similarity));
    }
    // All-pairs only reports one orientation
    assert_eq!(result.graph.weight(NodeId::new(DAVE), NodeId::new(ALICE)), None);
}

#[test]
fn test_graph_from_top_k() {
    let graph = create_likes_graph();
    let result = NodeSimilarity::new(
        &graph,
        NodeSimilarityConfig::new().with_top_k(1).with_concurrency(4),
    )
    .expect("valid config")
    .compute_to_graph()
    .expect("graph");

    assert!(result.top_k_graph);
    assert_eq!(result.graph.relationship_count(), 4);
    assert_eq!(result.graph.weight(NodeId::new(ALICE), NodeId::new(DAVE)), Some(1.0));
    assert_eq!(result.graph.weight(NodeId::new(DAVE), NodeId::new(ALICE)), Some(1.0));
    assert_eq!(result.graph.degree(NodeId::new(ALICE), Direction::Incoming), 3);
    assert_eq!(
        result.graph.to_original_node_id(NodeId::new(CHARLIE)),
        graph.to_original_node_id(NodeId::new(CHARLIE))
    );
}

#[test]
fn test_graph_from_top_n() {
    let graph = create_likes_graph();
    let result = NodeSimilarity::new(&graph, NodeSimilarityConfig::new().with_top_n(-1))
        .expect("valid config")
        .compute_to_graph()
        .expect("graph");

    assert_eq!(result.graph.relationship_count(), 1);
    assert_eq!(result.graph.weight(NodeId::new(BOB), NodeId::new(CHARLIE)), Some(0.0));
}

// ============================================================================
// Weighted similarity
// ============================================================================

#[test]
fn test_weighted_jaccard() {
    let graph = create_ratings_graph();
    let results = compute_both(
        &graph,
        NodeSimilarityConfig::new().with_relationship_weight_property("rating"),
    );

    // alice and bob rate identically; charlie swaps their ratings; dave
    // shares only item 1
    assert_results(
        &results,
        &[
            (ALICE, BOB, 1.0),
            (ALICE, CHARLIE, 2.0 / 10.0),
            (ALICE, DAVE, 2.0 / 10.0),
            (BOB, CHARLIE, 2.0 / 10.0),
            (BOB, DAVE, 2.0 / 10.0),
            (CHARLIE, DAVE, 1.0 / 11.0),
        ],
    );

    let unweighted = compute(&graph, NodeSimilarityConfig::new());
    assert_eq!(unweighted.iter().filter(|r| r.similarity == 1.0).count(), 3);
}

#[test]
fn test_weighted_top_k_and_cutoff() {
    let graph = create_ratings_graph();
    let config = NodeSimilarityConfig::new()
        .with_relationship_weight_property("rating")
        .with_top_k(1)
        .with_similarity_cutoff(0.2);
    let results = compute_both(&graph, config);
    assert_results(
        &results,
        &[(ALICE, BOB, 1.0), (BOB, ALICE, 1.0), (CHARLIE, ALICE, 0.2), (DAVE, ALICE, 0.2)],
    );
}

#[test]
fn test_weighted_run_requires_property() {
    let graph = create_likes_graph();
    let config: NodeSimilarityConfig =
        serde_json::from_str(r#"{"relationshipWeightProperty": "rating"}"#).expect("deserialize");
    assert!(matches!(NodeSimilarity::new(&graph, config), Err(GraphError::InvalidConfig(_))));
}

#[test]
fn test_similarity_graph_feeds_weighted_run() {
    let graph = create_likes_graph();
    let first = NodeSimilarity::new(&graph, NodeSimilarityConfig::new().with_top_k(2))
        .expect("valid config")
        .compute_to_graph()
        .expect("graph");

    let second = NodeSimilarity::new(
        &first.graph,
        NodeSimilarityConfig::new().with_relationship_weight_property(SIMILARITY_PROPERTY),
    )
    .expect("valid config")
    .compute_to_stream()
    .expect("compute")
    .collect_all()
    .expect("results");

    assert_eq!(second.len(), 6);
    assert!(second.iter().all(|r| (0.0..=1.0).contains(&r.similarity)));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_rejected_before_computation() {
    let graph = create_likes_graph();
    let invalid = [
        NodeSimilarityConfig::new().with_direction(Direction::Both),
        NodeSimilarityConfig::new().with_degree_cutoff(0),
        NodeSimilarityConfig::new().with_similarity_cutoff(-1.0),
        NodeSimilarityConfig::new().with_concurrency(0),
    ];
    for config in invalid {
        assert!(NodeSimilarity::new(&graph, config).is_err());
    }
}

#[test]
fn test_config_from_json() {
    let graph = create_likes_graph();
    let config: NodeSimilarityConfig =
        serde_json::from_str(r#"{"topK": -1, "concurrency": 2, "batchSize": 2}"#)
            .expect("deserialize");
    assert_eq!(config.mode(), ComputeMode::TopK);

    let results = compute(&graph, config);
    assert_eq!(results.len(), 4);

    let both = serde_json::from_str::<NodeSimilarityConfig>(r#"{"direction": "BOTH"}"#)
        .expect("deserialize");
    assert!(matches!(
        NodeSimilarity::new(&graph, both),
        Err(GraphError::UnsupportedDirection(Direction::Both))
    ));
}

// ============================================================================
// Properties on generated graphs
// ============================================================================

fn arbitrary_graph() -> impl Strategy<Value = (u64, Vec<(u64, u64)>)> {
    (4u64..24).prop_flat_map(|node_count| {
        let edges = prop::collection::vec((0..node_count, 0..node_count), 0..80);
        (Just(node_count), edges)
    })
}

fn pair_set(results: &[SimilarityResult]) -> BTreeSet<(u32, u32)> {
    results.iter().map(|r| (r.source.as_u32(), r.target.as_u32())).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn parallel_matches_sequential_in_every_mode(
        (node_count, edges) in arbitrary_graph(),
        top_k in -3i64..=3,
        top_n in -5i64..=5,
    ) {
        let graph = build_graph(node_count, &edges);
        let config = NodeSimilarityConfig::new().with_top_k(top_k).with_top_n(top_n);
        let sequential = compute(&graph, config.clone());
        let parallel = compute(&graph, config.with_concurrency(3).with_batch_size(2));
        prop_assert_eq!(sequential, parallel);
    }

    #[test]
    fn top_k_keeps_best_partners(
        (node_count, edges) in arbitrary_graph(),
        k in 1i64..=3,
    ) {
        let graph = build_graph(node_count, &edges);
        let all = compute(&graph, NodeSimilarityConfig::new());
        let top = compute(&graph, NodeSimilarityConfig::new().with_top_k(k));

        for source in 0..node_count as u32 {
            let held: Vec<f64> = top
                .iter()
                .filter(|r| r.source.as_u32() == source)
                .map(|r| r.similarity)
                .collect();
            prop_assert!(held.len() <= k as usize);

            let mut candidates: Vec<f64> = all
                .iter()
                .filter(|r| r.source.as_u32() == source || r.target.as_u32() == source)
                .map(|r| r.similarity)
                .collect();
            candidates.sort_by(|a, b| b.total_cmp(a));
            prop_assert_eq!(held.len(), candidates.len().min(k as usize));
            if let Some(&weakest) = held.iter().min_by(|a, b| a.total_cmp(b)) {
                for excluded in candidates.iter().skip(held.len()) {
                    prop_assert!(*excluded <= weakest);
                }
            }
        }
    }

    #[test]
    fn top_n_holds_highest_pairs(
        (node_count, edges) in arbitrary_graph(),
        n in 1i64..=6,
    ) {
        let graph = build_graph(node_count, &edges);
        let all = compute(&graph, NodeSimilarityConfig::new());
        let top = compute(&graph, NodeSimilarityConfig::new().with_top_n(n));

        prop_assert_eq!(top.len(), all.len().min(n as usize));
        prop_assert!(pair_set(&top).is_subset(&pair_set(&all)));

        let mut expected: Vec<f64> = all.iter().map(|r| r.similarity).collect();
        expected.sort_by(|a, b| b.total_cmp(a));
        expected.truncate(n as usize);
        let mut held: Vec<f64> = top.iter().map(|r| r.similarity).collect();
        held.sort_by(|a, b| b.total_cmp(a));
        prop_assert_eq!(held, expected);
    }
}

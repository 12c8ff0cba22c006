//! Integration tests for the embedding optimizer.
//!
//! Exercises the full pipeline: adjacency construction -> fitting ->
//! reading back coordinates, including the numerical-stability policies.

use ndarray::Array2;
use trellis::{
    graph, Algorithm, CauchySimilarity, Embedding, EmbeddingConfig, Error, FitOptions, Loss,
    ReciprocalDistance, SigmoidDot,
};

fn quiet(iterations: usize) -> FitOptions {
    FitOptions::default()
        .with_iterations(iterations)
        .with_verbose(false)
}

/// Euclidean distance between two embedded nodes.
fn node_distance(embedding: &Embedding, i: usize, j: usize) -> f32 {
    let coords = embedding.coordinates();
    let mut sum = 0.0;
    for k in 0..embedding.dimension() {
        let diff = coords[[i, k]] - coords[[j, k]];
        sum += diff * diff;
    }
    sum.sqrt()
}

#[test]
fn test_cycle_layout_descent() {
    // 4-node cycle: edges (0,1), (1,2), (2,3), (0,3); non-edges are the
    // two diagonals.
    let a = graph::cycle_adjacency(4);
    let mut embedding = Embedding::new(4, 2, CauchySimilarity).unwrap();

    let initial = embedding.loss_value(&a, true).unwrap();
    embedding.fit(&a, &quiet(150)).unwrap();
    let fitted = embedding.loss_value(&a, true).unwrap();

    assert!(
        fitted < initial,
        "expected descent: initial {} vs fitted {}",
        initial,
        fitted
    );

    // Connected pairs should end up closer than disconnected pairs
    let edge_mean = (node_distance(&embedding, 0, 1)
        + node_distance(&embedding, 1, 2)
        + node_distance(&embedding, 2, 3)
        + node_distance(&embedding, 0, 3))
        / 4.0;
    let non_edge_mean = (node_distance(&embedding, 0, 2) + node_distance(&embedding, 1, 3)) / 2.0;

    assert!(
        edge_mean < non_edge_mean,
        "edges {} should be shorter than non-edges {}",
        edge_mean,
        non_edge_mean
    );
}

#[test]
fn test_repeated_fit_continues_from_current_state() {
    // Two 75-iteration fits must land exactly where one 150-iteration fit
    // does: coordinates and Adam moments both persist between calls.
    let a = graph::cycle_adjacency(5);

    let mut single = Embedding::new(5, 2, CauchySimilarity).unwrap();
    single.fit(&a, &quiet(150)).unwrap();

    let mut split = Embedding::new(5, 2, CauchySimilarity).unwrap();
    split.fit(&a, &quiet(75)).unwrap();
    split.fit(&a, &quiet(75)).unwrap();

    assert_eq!(single.coordinates(), split.coordinates());
}

#[test]
fn test_sgd_descent() {
    let a = graph::cycle_adjacency(6);
    let config = EmbeddingConfig::default()
        .with_algorithm(Algorithm::Sgd)
        .with_learning_rate(0.01);
    let mut embedding = Embedding::with_config(6, 2, CauchySimilarity, config).unwrap();

    let initial = embedding.loss_value(&a, true).unwrap();
    embedding.fit(&a, &quiet(300)).unwrap();

    assert!(embedding.loss_value(&a, true).unwrap() < initial);
}

#[test]
fn test_cross_entropy_with_sigmoid_kernel() {
    let a = graph::cycle_adjacency(4);
    let config = EmbeddingConfig::default().with_loss(Loss::BinaryCrossEntropy);
    let mut embedding = Embedding::with_config(4, 2, SigmoidDot::default(), config).unwrap();

    let initial = embedding.loss_value(&a, true).unwrap();
    embedding.fit(&a, &quiet(100)).unwrap();
    let fitted = embedding.loss_value(&a, true).unwrap();

    assert!(fitted.is_finite());
    assert!(fitted < initial);
}

#[test]
fn test_coincident_nodes_freeze_but_stay_finite() {
    // Nodes 0 and 1 share a location, so their pair gradient under the
    // reciprocal-distance kernel is NaN every iteration. Sanitization
    // zeroes it: the pair never moves, everything stays finite, and the
    // remaining nodes still train.
    let coords = ndarray::array![[0.5, 0.5], [0.5, 0.5], [1.5, 0.3], [0.2, 1.4]];
    let mut embedding = Embedding::from_coordinates(
        coords.clone(),
        ReciprocalDistance::default(),
        EmbeddingConfig::default(),
    )
    .unwrap();

    let a = graph::cycle_adjacency(4);
    embedding.fit(&a, &quiet(25)).unwrap();

    let after = embedding.coordinates();
    assert!(after.iter().all(|x| x.is_finite()));
    assert_eq!(after.row(0), coords.row(0));
    assert_eq!(after.row(1), coords.row(1));
    assert_ne!(after.row(2), coords.row(2));
}

#[test]
fn test_fit_wrong_shape_fails_fast() {
    let mut embedding = Embedding::new(4, 2, CauchySimilarity).unwrap();
    let before = embedding.coordinates().to_owned();

    let target = Array2::<f32>::zeros((6, 6));
    let err = embedding.fit(&target, &quiet(10)).unwrap_err();

    assert!(matches!(
        err,
        Error::ShapeMismatch {
            expected: (4, 4),
            found: (6, 6)
        }
    ));
    assert_eq!(embedding.coordinates(), before.view());
}

#[test]
fn test_callback_runs_every_iteration() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let a = graph::cycle_adjacency(4);
    let mut embedding = Embedding::new(4, 2, CauchySimilarity).unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    embedding
        .fit_with_callback(
            &a,
            &quiet(40),
            Box::new(move |_iteration, metrics| {
                assert!(metrics.loss.is_finite());
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 40);
}

#[test]
fn test_fit_with_diagonal_included() {
    // With the diagonal kept, the Cauchy kernel's constant B_ii = 1 terms
    // add a fixed offset to the loss but contribute no gradient; the
    // off-diagonal structure still fits.
    let mut a = graph::cycle_adjacency(4);
    a.diag_mut().fill(1.0);

    let mut embedding = Embedding::new(4, 2, CauchySimilarity).unwrap();
    let initial = embedding.loss_value(&a, false).unwrap();

    let options = quiet(150).with_exclude_diagonal(false);
    embedding.fit(&a, &options).unwrap();

    assert!(embedding.loss_value(&a, false).unwrap() < initial);
}

#[test]
fn test_snapshot_json_roundtrip() {
    let a = graph::cycle_adjacency(5);
    let mut embedding = Embedding::new(5, 3, CauchySimilarity).unwrap();
    embedding.fit(&a, &quiet(20)).unwrap();

    let snapshot = embedding.snapshot();
    let json = snapshot.to_json().unwrap();
    let restored = trellis::LayoutSnapshot::from_json(&json).unwrap();

    assert_eq!(restored.nodes, 5);
    assert_eq!(restored.dimension, 3);
    assert_eq!(restored.coordinates, snapshot.coordinates);
}

#[test]
fn test_petgraph_to_layout_pipeline() {
    use petgraph::graph::UnGraph;

    let mut g = UnGraph::<&str, ()>::new_undirected();
    let a = g.add_node("a");
    let b = g.add_node("b");
    let c = g.add_node("c");
    let d = g.add_node("d");
    g.add_edge(a, b, ());
    g.add_edge(b, c, ());
    g.add_edge(c, d, ());

    let adjacency = graph::adjacency_matrix(&g);
    let mut embedding = Embedding::new(4, 2, CauchySimilarity).unwrap();

    let initial = embedding.loss_value(&adjacency, true).unwrap();
    embedding.fit(&adjacency, &quiet(100)).unwrap();

    assert!(embedding.loss_value(&adjacency, true).unwrap() < initial);
}

#[test]
fn test_embedding_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Embedding>();
}

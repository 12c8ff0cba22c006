//! Adjacency-matrix helpers.
//!
//! The embedding consumes dense (N, N) `f32` adjacency matrices with rows
//! and columns in node-index order. These helpers build them from
//! `petgraph` graphs and plain edge lists, and provide the small generators
//! the demos and tests use.

use crate::error::{Error, Result};
use ndarray::Array2;
use petgraph::graph::Graph;
use petgraph::visit::EdgeRef;
use petgraph::EdgeType;

/// Dense adjacency matrix of a `petgraph` graph.
///
/// Entry (i, j) is 1.0 where an edge exists; undirected graphs are
/// symmetrized. Node indices must be compact (no prior removals), which
/// holds for any freshly built graph.
pub fn adjacency_matrix<N, E, Ty: EdgeType>(graph: &Graph<N, E, Ty>) -> Array2<f32> {
    let n = graph.node_count();
    let mut a = Array2::zeros((n, n));
    for edge in graph.edge_references() {
        let (s, t) = (edge.source().index(), edge.target().index());
        a[[s, t]] = 1.0;
        if !graph.is_directed() {
            a[[t, s]] = 1.0;
        }
    }
    a
}

/// Symmetric adjacency matrix from an undirected edge list.
pub fn adjacency_from_edges(nodes: usize, edges: &[(usize, usize)]) -> Result<Array2<f32>> {
    let mut a = Array2::zeros((nodes, nodes));
    for &(i, j) in edges {
        if i >= nodes {
            return Err(Error::NodeOutOfRange { node: i, nodes });
        }
        if j >= nodes {
            return Err(Error::NodeOutOfRange { node: j, nodes });
        }
        a[[i, j]] = 1.0;
        a[[j, i]] = 1.0;
    }
    Ok(a)
}

/// Adjacency matrix of an n-cycle: node i connects to (i + 1) mod n.
pub fn cycle_adjacency(nodes: usize) -> Array2<f32> {
    let mut a = Array2::zeros((nodes, nodes));
    if nodes < 2 {
        return a;
    }
    for i in 0..nodes {
        let j = (i + 1) % nodes;
        a[[i, j]] = 1.0;
        a[[j, i]] = 1.0;
    }
    a
}

/// Adjacency matrix of an n-node path.
pub fn path_adjacency(nodes: usize) -> Array2<f32> {
    let mut a = Array2::zeros((nodes, nodes));
    for i in 1..nodes {
        a[[i - 1, i]] = 1.0;
        a[[i, i - 1]] = 1.0;
    }
    a
}

/// Adjacency matrix of the complete graph on n nodes (zero diagonal).
pub fn complete_adjacency(nodes: usize) -> Array2<f32> {
    let mut a = Array2::from_elem((nodes, nodes), 1.0);
    a.diag_mut().fill(0.0);
    a
}

/// Upper-triangle nonzero entries of an adjacency matrix as (i, j) pairs.
///
/// The inverse helper a renderer needs to draw links between laid-out
/// nodes.
pub fn edge_list(adjacency: &Array2<f32>) -> Vec<(usize, usize)> {
    let n = adjacency.nrows();
    let mut edges = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            if adjacency[[i, j]] != 0.0 {
                edges.push((i, j));
            }
        }
    }
    edges
}

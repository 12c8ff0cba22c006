//! Error types for trellis.

use thiserror::Error;

/// Errors that can occur while building or fitting an embedding.
#[derive(Error, Debug)]
pub enum Error {
    /// Matrix dimensions disagree with the embedding's node count, or two
    /// loss operands differ in shape.
    #[error("Shape mismatch: expected {expected:?}, got {found:?}")]
    ShapeMismatch {
        /// The shape required by the embedding or loss.
        expected: (usize, usize),
        /// The shape actually supplied.
        found: (usize, usize),
    },

    /// Invalid construction parameter (zero node count or dimension,
    /// non-positive learning rate or spread).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Edge endpoint outside the node range of an adjacency builder.
    #[error("Node index {node} out of range for a graph with {nodes} nodes")]
    NodeOutOfRange {
        /// The offending node index.
        node: usize,
        /// Number of nodes in the graph.
        nodes: usize,
    },

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for trellis.
pub type Result<T> = std::result::Result<T, Error>;

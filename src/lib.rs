#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_precision_loss)]

//! Graph layout by differentiable latent-space embedding.
//!
//! `trellis` places the nodes of a graph in a low-dimensional coordinate
//! space by gradient descent: a differentiable kernel reconstructs an
//! adjacency-like matrix from the coordinates, and the coordinates are
//! adjusted until the reconstruction matches the graph's actual adjacency
//! matrix. The fitted coordinates double as a network layout: connected
//! nodes end up close, disconnected nodes far apart.
//!
//! ## The Core Intuition
//!
//! Pick a kernel B(Z) mapping coordinates Z (one row per node) to pairwise
//! link strengths, then minimize the reconstruction error against the
//! adjacency matrix A:
//!
//! ```text
//! Z* = argmin_Z  Σᵢⱼ (B(Z)ᵢⱼ − Aᵢⱼ)²      (i ≠ j: self-links are excluded)
//! ```
//!
//! Each kernel encodes a different geometric hypothesis about what a link
//! means:
//!
//! | Kernel | B_ij | Hypothesis |
//! |--------|------|------------|
//! | [`CauchySimilarity`] | 1 / (1 + ‖zᵢ − zⱼ‖²) | Links are short distances |
//! | [`ReciprocalDistance`] | 1 / (ε + ‖zᵢ − zⱼ‖) | Links are short distances, heavier pull |
//! | [`SigmoidDot`] | σ(zᵢ · zⱼ + c) | Links are aligned directions |
//!
//! Gradients are hand-derived per kernel; there is no autograd tape. NaN
//! gradient elements (e.g. from coincident points under a singular kernel)
//! are zeroed before each update, and every gradient element is clamped to
//! ±15 so a single outlier step cannot fling the layout apart.
//!
//! ## Usage
//!
//! ```
//! use trellis::{graph, CauchySimilarity, Embedding, FitOptions};
//!
//! # fn main() -> trellis::Result<()> {
//! // A 6-node cycle
//! let a = graph::cycle_adjacency(6);
//!
//! // Embed into 2 dimensions and fit
//! let mut embedding = Embedding::new(6, 2, CauchySimilarity)?;
//! embedding.fit(&a, &FitOptions::default().with_verbose(false))?;
//!
//! // Coordinates for plotting, one row per node
//! let coords = embedding.coordinates();
//! assert_eq!(coords.dim(), (6, 2));
//! # Ok(())
//! # }
//! ```
//!
//! Fitting is single-threaded and synchronous; every `fit` call runs its
//! full iteration count, and repeated calls continue from the current
//! coordinates with optimizer state intact, so an external animation loop
//! can interleave short fits with snapshots.
//!
//! ## References
//!
//! - Hoff, Raftery & Handcock (2002). "Latent Space Approaches to Social
//!   Network Analysis." JASA.
//! - van der Maaten & Hinton (2008). "Visualizing Data using t-SNE." JMLR.
//! - Kingma & Ba (2014). "Adam: A Method for Stochastic Optimization."

mod embedding;
mod error;
pub mod graph;
mod loss;
mod optim;
mod recon;

pub use embedding::{
    Embedding, EmbeddingConfig, FitMetrics, FitOptions, LayoutSnapshot, ProgressCallback,
};
pub use error::{Error, Result};
pub use loss::{Loss, LossGradientFn, LossValueFn};
pub use optim::{Algorithm, Optimizer, CLIP_VALUE};
pub use recon::{CauchySimilarity, ReciprocalDistance, Reconstruction, SigmoidDot};

// Re-export the linear-algebra and graph substrates
pub use ndarray;
pub use petgraph;

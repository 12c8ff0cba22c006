//! The embedding optimizer: latent coordinates fitted by gradient descent.
//!
//! [`Embedding`] owns an (N, d) coordinate matrix and repeatedly adjusts it
//! so that a [`Reconstruction`] kernel applied to the coordinates
//! approximates a target adjacency matrix. Each [`Embedding::fit`] call runs
//! a fixed number of iterations:
//!
//! 1. reconstruct B from the current coordinates;
//! 2. optionally zero B's diagonal (self-links are never optimized);
//! 3. compute the loss and its gradient with respect to B;
//! 4. pull the gradient back to coordinate space through the kernel;
//! 5. sanitize (NaN → 0), clip to ±15, and apply the optimizer update.
//!
//! Coordinates are mutated in place and optimizer state persists across fit
//! calls, so an external animation loop can interleave short fits with
//! snapshots of the coordinates:
//!
//! ```
//! use trellis::{graph, CauchySimilarity, Embedding, FitOptions};
//!
//! # fn main() -> trellis::Result<()> {
//! let a = graph::cycle_adjacency(6);
//! let mut embedding = Embedding::new(6, 2, CauchySimilarity)?;
//!
//! let options = FitOptions::default().with_iterations(15).with_verbose(false);
//! for _frame in 0..10 {
//!     embedding.fit(&a, &options)?;
//!     let _coords = embedding.coordinates(); // hand to the renderer
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Single-node embeddings are accepted but degenerate: with the diagonal
//! excluded there is nothing left to fit, and the coordinates never move.

use crate::error::{Error, Result};
use crate::loss::Loss;
use crate::optim::{Algorithm, Optimizer};
use crate::recon::Reconstruction;
use ndarray::{Array2, ArrayView2};
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};
use rand_xorshift::XorShiftRng;
use serde::{Deserialize, Serialize};

/// Construction-time configuration.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Learning rate (default: 0.1).
    pub learning_rate: f32,
    /// Coordinates are initialized uniformly in [0, spread) (default: 1.0).
    pub spread: f32,
    /// Update rule (default: Adam).
    pub algorithm: Algorithm,
    /// Reconstruction loss (default: least squares).
    pub loss: Loss,
    /// Random seed for coordinate initialization (default: 42).
    pub seed: u64,
    /// Verbose fits report the loss every this many iterations
    /// (default: 100).
    pub report_interval: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            spread: 1.0,
            algorithm: Algorithm::Adam,
            loss: Loss::LeastSquares,
            seed: 42,
            report_interval: 100,
        }
    }
}

impl EmbeddingConfig {
    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_spread(mut self, spread: f32) -> Self {
        self.spread = spread;
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_loss(mut self, loss: Loss) -> Self {
        self.loss = loss;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_report_interval(mut self, report_interval: usize) -> Self {
        self.report_interval = report_interval;
        self
    }
}

/// Per-call fitting options.
#[derive(Debug, Clone, Copy)]
pub struct FitOptions {
    /// Gradient-descent iterations per call (default: 150).
    pub iterations: usize,
    /// Report the loss on stderr at the configured interval (default: true).
    pub verbose: bool,
    /// Zero the reconstruction's diagonal before the loss, so self-links
    /// are neither penalized nor optimized (default: true).
    pub exclude_diagonal: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            iterations: 150,
            verbose: true,
            exclude_diagonal: true,
        }
    }
}

impl FitOptions {
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_exclude_diagonal(mut self, exclude_diagonal: bool) -> Self {
        self.exclude_diagonal = exclude_diagonal;
        self
    }
}

/// Metrics from one fitting iteration.
#[derive(Debug, Clone, Default)]
pub struct FitMetrics {
    /// Iteration index within the current fit call.
    pub iteration: usize,
    /// Loss at this iteration, computed before the update.
    pub loss: f32,
}

/// Callback invoked once per fitting iteration.
pub type ProgressCallback = Box<dyn Fn(usize, &FitMetrics) + Send + Sync>;

/// A serializable snapshot of the current layout, for external plotting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    /// Number of nodes.
    pub nodes: usize,
    /// Latent dimensionality.
    pub dimension: usize,
    /// One coordinate row per node.
    pub coordinates: Vec<Vec<f32>>,
}

impl LayoutSnapshot {
    /// Serialize the snapshot to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize a snapshot from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Latent coordinates for a graph's nodes, plus the machinery to fit them.
pub struct Embedding {
    nodes: usize,
    dim: usize,
    coords: Array2<f32>,
    recon: Box<dyn Reconstruction>,
    loss: Loss,
    optimizer: Optimizer,
    report_interval: usize,
}

impl Embedding {
    /// Build an embedding with default configuration.
    ///
    /// Coordinates are drawn uniformly from [0, spread) with a seeded RNG,
    /// so construction is deterministic for a given configuration.
    pub fn new(nodes: usize, dim: usize, recon: impl Reconstruction + 'static) -> Result<Self> {
        Self::with_config(nodes, dim, recon, EmbeddingConfig::default())
    }

    /// Build an embedding with explicit configuration.
    pub fn with_config(
        nodes: usize,
        dim: usize,
        recon: impl Reconstruction + 'static,
        config: EmbeddingConfig,
    ) -> Result<Self> {
        validate(nodes, dim, &config)?;

        let mut rng = XorShiftRng::seed_from_u64(config.seed);
        let between = Uniform::new(0.0f32, config.spread);
        let coords = Array2::from_shape_fn((nodes, dim), |_| between.sample(&mut rng));

        Ok(Self {
            nodes,
            dim,
            coords,
            recon: Box::new(recon),
            loss: config.loss,
            optimizer: Optimizer::new(config.algorithm, config.learning_rate, (nodes, dim)),
            report_interval: config.report_interval.max(1),
        })
    }

    /// Build an embedding from an existing coordinate matrix (warm start).
    ///
    /// The node count and dimensionality are taken from the matrix shape;
    /// optimizer state starts fresh.
    pub fn from_coordinates(
        coords: Array2<f32>,
        recon: impl Reconstruction + 'static,
        config: EmbeddingConfig,
    ) -> Result<Self> {
        let (nodes, dim) = coords.dim();
        validate(nodes, dim, &config)?;

        Ok(Self {
            nodes,
            dim,
            coords,
            recon: Box::new(recon),
            loss: config.loss,
            optimizer: Optimizer::new(config.algorithm, config.learning_rate, (nodes, dim)),
            report_interval: config.report_interval.max(1),
        })
    }

    /// Apply the reconstruction kernel to the current coordinates.
    ///
    /// Pure read: repeated calls without an intervening fit return
    /// identical matrices.
    pub fn reconstruct(&self) -> Array2<f32> {
        self.recon.reconstruct(&self.coords)
    }

    /// Fit the coordinates to `target` by gradient descent.
    ///
    /// `target` must be (N, N) for an embedding built with N nodes;
    /// anything else fails with [`Error::ShapeMismatch`] before any state
    /// changes. Repeated calls continue from the current coordinates and
    /// optimizer state.
    pub fn fit(&mut self, target: &Array2<f32>, options: &FitOptions) -> Result<()> {
        self.fit_inner(target, options, None)
    }

    /// Like [`Embedding::fit`], invoking `callback` every iteration.
    pub fn fit_with_callback(
        &mut self,
        target: &Array2<f32>,
        options: &FitOptions,
        callback: ProgressCallback,
    ) -> Result<()> {
        self.fit_inner(target, options, Some(callback))
    }

    fn fit_inner(
        &mut self,
        target: &Array2<f32>,
        options: &FitOptions,
        callback: Option<ProgressCallback>,
    ) -> Result<()> {
        self.check_target(target)?;

        for iteration in 0..options.iterations {
            let mut recon = self.recon.reconstruct(&self.coords);
            if options.exclude_diagonal {
                recon.diag_mut().fill(0.0);
            }

            let loss_value = self.loss.value(&recon, target)?;
            let mut upstream = self.loss.gradient(&recon, target)?;
            if options.exclude_diagonal {
                // Masked entries do not propagate
                upstream.diag_mut().fill(0.0);
            }

            let grad = self.recon.backward(&self.coords, &upstream);
            self.optimizer.step(&mut self.coords, grad);

            if options.verbose && iteration % self.report_interval == 0 {
                eprintln!("iteration {}: loss = {:.4}", iteration, loss_value);
            }
            if let Some(callback) = &callback {
                let metrics = FitMetrics {
                    iteration,
                    loss: loss_value,
                };
                callback(iteration, &metrics);
            }
        }

        Ok(())
    }

    /// Current loss against `target`, without taking a step.
    pub fn loss_value(&self, target: &Array2<f32>, exclude_diagonal: bool) -> Result<f32> {
        self.check_target(target)?;

        let mut recon = self.reconstruct();
        if exclude_diagonal {
            recon.diag_mut().fill(0.0);
        }
        self.loss.value(&recon, target)
    }

    /// Read-only view of the current (N, d) coordinates.
    pub fn coordinates(&self) -> ArrayView2<'_, f32> {
        self.coords.view()
    }

    /// Serializable copy of the current layout.
    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            nodes: self.nodes,
            dimension: self.dim,
            coordinates: self.coords.outer_iter().map(|row| row.to_vec()).collect(),
        }
    }

    /// Number of embedded nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes
    }

    /// Latent dimensionality.
    pub fn dimension(&self) -> usize {
        self.dim
    }

    /// Name of the reconstruction kernel.
    pub fn kernel_name(&self) -> &'static str {
        self.recon.name()
    }

    fn check_target(&self, target: &Array2<f32>) -> Result<()> {
        if target.dim() != (self.nodes, self.nodes) {
            return Err(Error::ShapeMismatch {
                expected: (self.nodes, self.nodes),
                found: target.dim(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for Embedding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedding")
            .field("nodes", &self.nodes)
            .field("dim", &self.dim)
            .field("kernel", &self.recon.name())
            .field("loss", &self.loss)
            .finish()
    }
}

fn validate(nodes: usize, dim: usize, config: &EmbeddingConfig) -> Result<()> {
    if nodes == 0 {
        return Err(Error::InvalidConfig("node count must be positive".into()));
    }
    if dim == 0 {
        return Err(Error::InvalidConfig(
            "latent dimensionality must be positive".into(),
        ));
    }
    if !config.learning_rate.is_finite() || config.learning_rate <= 0.0 {
        return Err(Error::InvalidConfig(format!(
            "learning rate must be positive and finite, got {}",
            config.learning_rate
        )));
    }
    if !config.spread.is_finite() || config.spread <= 0.0 {
        return Err(Error::InvalidConfig(format!(
            "spread must be positive and finite, got {}",
            config.spread
        )));
    }
    Ok(())
}

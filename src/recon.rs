//! Reconstruction kernels: from latent coordinates to an adjacency-like matrix.
//!
//! A reconstruction maps the (N, d) coordinate matrix to an (N, N) matrix of
//! pairwise link strengths. Fitting differentiates through it, so every
//! kernel ships its own hand-derived backward pass: the abstraction sits at
//! the kernel level, not the tensor level, and there is no autograd tape.
//!
//! ## Built-in kernels
//!
//! | Kernel | B_ij | Character |
//! |--------|------|-----------|
//! | [`CauchySimilarity`] | 1 / (1 + ‖zᵢ − zⱼ‖²) | Smooth everywhere; the default for layout |
//! | [`ReciprocalDistance`] | 1 / (ε + ‖zᵢ − zⱼ‖) | Heavier attraction; gradient singular at coincident points |
//! | [`SigmoidDot`] | σ(zᵢ · zⱼ + c) | Inner-product model; link strength from alignment, not distance |
//!
//! Distance kernels produce symmetric reconstructions, so connected nodes
//! are pulled together and disconnected nodes pushed apart, which is what
//! makes the fitted coordinates readable as a layout.
//!
//! ## Custom kernels
//!
//! Implement [`Reconstruction`] for your own type. `backward` receives the
//! loss gradient with respect to the reconstruction (`upstream`, (N, N)) and
//! must return the loss gradient with respect to the coordinates ((N, d)):
//!
//! ```text
//! grad[i] = Σⱼ upstream[i, j] · ∂B_ij/∂z_i  +  Σⱼ upstream[j, i] · ∂B_ji/∂z_i
//! ```
//!
//! NaN entries in the returned gradient are tolerated: the optimizer zeroes
//! them before the update, so a singular pair freezes for one step instead
//! of corrupting the whole layout.

use ndarray::Array2;

/// A differentiable map from latent coordinates to an (N, N) reconstruction.
pub trait Reconstruction: Send + Sync {
    /// Map latent coordinates of shape (N, d) to an (N, N) matrix.
    fn reconstruct(&self, coords: &Array2<f32>) -> Array2<f32>;

    /// Pull an (N, N) loss gradient back to coordinate space (N, d).
    fn backward(&self, coords: &Array2<f32>, upstream: &Array2<f32>) -> Array2<f32>;

    /// Kernel name, for debugging and progress output.
    fn name(&self) -> &'static str;
}

/// Squared Euclidean distance between rows `i` and `j`.
#[inline]
fn sq_dist(coords: &Array2<f32>, i: usize, j: usize) -> f32 {
    let mut sum = 0.0;
    for k in 0..coords.ncols() {
        let diff = coords[[i, k]] - coords[[j, k]];
        sum += diff * diff;
    }
    sum
}

/// Cauchy similarity: B_ij = 1 / (1 + ‖zᵢ − zⱼ‖²).
///
/// The heavy-tailed kernel used by t-SNE for its low-dimensional map
/// (van der Maaten & Hinton 2008). Bounded in (0, 1], equal to 1 exactly at
/// coincident points, and smooth everywhere, so it never produces NaN
/// gradients.
#[derive(Debug, Clone, Copy, Default)]
pub struct CauchySimilarity;

impl Reconstruction for CauchySimilarity {
    fn reconstruct(&self, coords: &Array2<f32>) -> Array2<f32> {
        let n = coords.nrows();
        let mut b = Array2::zeros((n, n));
        for i in 0..n {
            b[[i, i]] = 1.0;
            for j in 0..i {
                let v = 1.0 / (1.0 + sq_dist(coords, i, j));
                b[[i, j]] = v;
                b[[j, i]] = v;
            }
        }
        b
    }

    fn backward(&self, coords: &Array2<f32>, upstream: &Array2<f32>) -> Array2<f32> {
        let (n, d) = coords.dim();
        let mut grad = Array2::zeros((n, d));
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue; // ∂B_ii/∂z_i = 0: the diagonal is constant
                }
                let v = 1.0 / (1.0 + sq_dist(coords, i, j));
                let coeff = -2.0 * v * v * (upstream[[i, j]] + upstream[[j, i]]);
                for k in 0..d {
                    grad[[i, k]] += coeff * (coords[[i, k]] - coords[[j, k]]);
                }
            }
        }
        grad
    }

    fn name(&self) -> &'static str {
        "CauchySimilarity"
    }
}

/// Reciprocal distance: B_ij = 1 / (ε + ‖zᵢ − zⱼ‖).
///
/// The classic inverse-distance similarity. Its gradient divides by the
/// distance, so coincident points (distance exactly zero) yield NaN here;
/// the optimizer's sanitize pass zeroes those entries and the pair simply
/// does not move that step.
#[derive(Debug, Clone, Copy)]
pub struct ReciprocalDistance {
    /// Offset keeping the forward value finite at zero distance.
    pub epsilon: f32,
}

impl Default for ReciprocalDistance {
    fn default() -> Self {
        Self { epsilon: 1.0 }
    }
}

impl Reconstruction for ReciprocalDistance {
    fn reconstruct(&self, coords: &Array2<f32>) -> Array2<f32> {
        let n = coords.nrows();
        let mut b = Array2::zeros((n, n));
        for i in 0..n {
            b[[i, i]] = 1.0 / self.epsilon;
            for j in 0..i {
                let v = 1.0 / (self.epsilon + sq_dist(coords, i, j).sqrt());
                b[[i, j]] = v;
                b[[j, i]] = v;
            }
        }
        b
    }

    fn backward(&self, coords: &Array2<f32>, upstream: &Array2<f32>) -> Array2<f32> {
        let (n, d) = coords.dim();
        let mut grad = Array2::zeros((n, d));
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dist = sq_dist(coords, i, j).sqrt();
                let v = 1.0 / (self.epsilon + dist);
                // dist == 0 makes this NaN; sanitized downstream
                let coeff = -(upstream[[i, j]] + upstream[[j, i]]) * v * v / dist;
                for k in 0..d {
                    grad[[i, k]] += coeff * (coords[[i, k]] - coords[[j, k]]);
                }
            }
        }
        grad
    }

    fn name(&self) -> &'static str {
        "ReciprocalDistance"
    }
}

/// Sigmoid inner product: B_ij = σ(zᵢ · zⱼ + bias).
///
/// The latent-space link model of Hoff, Raftery & Handcock (2002): link
/// probability from coordinate alignment rather than proximity. Useful with
/// [`Loss::BinaryCrossEntropy`](crate::Loss::BinaryCrossEntropy).
#[derive(Debug, Clone, Copy, Default)]
pub struct SigmoidDot {
    /// Additive bias inside the sigmoid.
    pub bias: f32,
}

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

impl SigmoidDot {
    #[inline]
    fn dot(coords: &Array2<f32>, i: usize, j: usize) -> f32 {
        let mut sum = 0.0;
        for k in 0..coords.ncols() {
            sum += coords[[i, k]] * coords[[j, k]];
        }
        sum
    }
}

impl Reconstruction for SigmoidDot {
    fn reconstruct(&self, coords: &Array2<f32>) -> Array2<f32> {
        let n = coords.nrows();
        let mut b = Array2::zeros((n, n));
        for i in 0..n {
            for j in 0..=i {
                let v = sigmoid(Self::dot(coords, i, j) + self.bias);
                b[[i, j]] = v;
                b[[j, i]] = v;
            }
        }
        b
    }

    fn backward(&self, coords: &Array2<f32>, upstream: &Array2<f32>) -> Array2<f32> {
        let (n, d) = coords.dim();
        let mut grad = Array2::zeros((n, d));
        for i in 0..n {
            for j in 0..n {
                let s = sigmoid(Self::dot(coords, i, j) + self.bias);
                let ds = s * (1.0 - s);
                if i == j {
                    // B_ii = σ(‖z_i‖² + c): the self term differentiates to 2 z_i
                    let coeff = upstream[[i, i]] * ds * 2.0;
                    for k in 0..d {
                        grad[[i, k]] += coeff * coords[[i, k]];
                    }
                } else {
                    let coeff = (upstream[[i, j]] + upstream[[j, i]]) * ds;
                    for k in 0..d {
                        grad[[i, k]] += coeff * coords[[j, k]];
                    }
                }
            }
        }
        grad
    }

    fn name(&self) -> &'static str {
        "SigmoidDot"
    }
}

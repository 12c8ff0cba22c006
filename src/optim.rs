//! Gradient-descent update rules.
//!
//! Two algorithms behind a uniform step interface: plain SGD and Adam.
//! Adam implements bias-corrected first/second moment estimates with
//! per-parameter adaptive learning rates.
//!
//! Reference: Kingma & Ba (2014), "Adam: A Method for Stochastic Optimization"
//!
//! Every step first sanitizes the gradient (NaN elements become zero; a
//! single unstable pair must not corrupt the whole coordinate array) and
//! then clamps each element to [`CLIP_VALUE`] in magnitude.

use ndarray::Array2;

/// Per-element gradient clamp applied before every update.
pub const CLIP_VALUE: f32 = 15.0;

/// Which update rule the embedding uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// Plain gradient descent, no momentum.
    Sgd,
    /// Adaptive moment estimation.
    #[default]
    Adam,
}

/// Plain gradient-descent state.
#[derive(Debug, Clone)]
pub struct Sgd {
    learning_rate: f32,
}

/// Adam state: moment estimates and the bias-correction step counter.
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    /// First-moment estimate, same shape as the parameter.
    m: Array2<f32>,
    /// Second-moment estimate, same shape as the parameter.
    v: Array2<f32>,
    /// Number of steps taken, for bias correction.
    step: u32,
}

/// A configured optimizer for a single (N, d) parameter matrix.
///
/// State persists across fit calls; resetting Adam's moments between calls
/// would degrade convergence.
#[derive(Debug, Clone)]
pub enum Optimizer {
    /// Plain gradient descent.
    Sgd(Sgd),
    /// Adaptive moment estimation.
    Adam(Adam),
}

impl Optimizer {
    /// Build an optimizer for a parameter of the given shape.
    pub fn new(algorithm: Algorithm, learning_rate: f32, shape: (usize, usize)) -> Self {
        match algorithm {
            Algorithm::Sgd => Self::Sgd(Sgd { learning_rate }),
            Algorithm::Adam => Self::Adam(Adam {
                learning_rate,
                beta1: 0.9,
                beta2: 0.999,
                epsilon: 1e-8,
                m: Array2::zeros(shape),
                v: Array2::zeros(shape),
                step: 0,
            }),
        }
    }

    /// Sanitize and clip `grad`, then apply one update to `param` in place.
    pub fn step(&mut self, param: &mut Array2<f32>, mut grad: Array2<f32>) {
        sanitize(&mut grad);
        clip(&mut grad, CLIP_VALUE);

        match self {
            Self::Sgd(sgd) => {
                let lr = sgd.learning_rate;
                param.zip_mut_with(&grad, |p, &g| *p -= lr * g);
            }
            Self::Adam(adam) => {
                adam.step += 1;
                let lr = adam.learning_rate;
                let (b1, b2, eps) = (adam.beta1, adam.beta2, adam.epsilon);
                let bc1 = 1.0 - b1.powi(adam.step as i32);
                let bc2 = 1.0 - b2.powi(adam.step as i32);
                ndarray::Zip::from(&mut *param)
                    .and(&mut adam.m)
                    .and(&mut adam.v)
                    .and(&grad)
                    .for_each(|p, m, v, &g| {
                        *m = b1 * *m + (1.0 - b1) * g;
                        *v = b2 * *v + (1.0 - b2) * g * g;
                        let m_hat = *m / bc1;
                        let v_hat = *v / bc2;
                        *p -= lr * m_hat / (v_hat.sqrt() + eps);
                    });
            }
        }
    }

    /// The configured learning rate.
    pub fn learning_rate(&self) -> f32 {
        match self {
            Self::Sgd(sgd) => sgd.learning_rate,
            Self::Adam(adam) => adam.learning_rate,
        }
    }
}

/// Replace NaN gradient elements with zero.
///
/// Infinities pass through and are bounded by the clip instead; only NaN
/// would propagate multiplicatively through every later update.
fn sanitize(grad: &mut Array2<f32>) {
    grad.mapv_inplace(|g| if g.is_nan() { 0.0 } else { g });
}

/// Clamp every gradient element to [-limit, limit].
fn clip(grad: &mut Array2<f32>, limit: f32) {
    grad.mapv_inplace(|g| g.clamp(-limit, limit));
}

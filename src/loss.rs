//! Loss functions for reconstruction error.
//!
//! A loss compares a reconstructed adjacency-like matrix against the target
//! adjacency matrix and produces a scalar, plus a gradient with respect to
//! the reconstruction for the fitting loop. Both operands must share the
//! same shape; anything else is a [`Error::ShapeMismatch`].
//!
//! The default is least squares, `Σ (B - A)²`. Binary cross-entropy is
//! provided for kernels whose output lives in (0, 1), and `Custom` accepts
//! a user-supplied value/gradient pair with the same signature.

use crate::error::{Error, Result};
use ndarray::Array2;
use std::fmt;
use std::sync::Arc;

/// Clamp bound keeping cross-entropy logs finite.
const BCE_EPS: f32 = 1e-7;

/// User-supplied loss value: `(reconstruction, target) -> scalar`.
pub type LossValueFn = Arc<dyn Fn(&Array2<f32>, &Array2<f32>) -> f32 + Send + Sync>;

/// User-supplied loss gradient with respect to the reconstruction.
pub type LossGradientFn = Arc<dyn Fn(&Array2<f32>, &Array2<f32>) -> Array2<f32> + Send + Sync>;

/// Dissimilarity between a reconstruction and a target adjacency matrix.
#[derive(Clone, Default)]
pub enum Loss {
    /// Sum of squared elementwise differences: `Σ (B - A)²`.
    #[default]
    LeastSquares,
    /// Binary cross-entropy; reconstruction entries are clamped away from
    /// 0 and 1 before the logs.
    BinaryCrossEntropy,
    /// User-supplied value and gradient closures.
    Custom {
        /// Scalar loss.
        value: LossValueFn,
        /// Gradient of the loss with respect to the reconstruction.
        gradient: LossGradientFn,
    },
}

impl Loss {
    /// Scalar loss between `recon` and `target`.
    pub fn value(&self, recon: &Array2<f32>, target: &Array2<f32>) -> Result<f32> {
        check_shapes(recon, target)?;
        Ok(match self {
            Self::LeastSquares => (recon - target).mapv(|x| x * x).sum(),
            Self::BinaryCrossEntropy => {
                let mut total = 0.0;
                for (&b, &a) in recon.iter().zip(target.iter()) {
                    let p = b.clamp(BCE_EPS, 1.0 - BCE_EPS);
                    total -= a * p.ln() + (1.0 - a) * (1.0 - p).ln();
                }
                total
            }
            Self::Custom { value, .. } => value(recon, target),
        })
    }

    /// Gradient of the loss with respect to `recon`, shape matching `recon`.
    pub fn gradient(&self, recon: &Array2<f32>, target: &Array2<f32>) -> Result<Array2<f32>> {
        check_shapes(recon, target)?;
        Ok(match self {
            Self::LeastSquares => (recon - target).mapv(|x| 2.0 * x),
            Self::BinaryCrossEntropy => {
                let mut grad = Array2::zeros(recon.dim());
                ndarray::Zip::from(&mut grad)
                    .and(recon)
                    .and(target)
                    .for_each(|g, &b, &a| {
                        let p = b.clamp(BCE_EPS, 1.0 - BCE_EPS);
                        *g = -a / p + (1.0 - a) / (1.0 - p);
                    });
                grad
            }
            Self::Custom { gradient, .. } => gradient(recon, target),
        })
    }
}

impl fmt::Debug for Loss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeastSquares => f.write_str("LeastSquares"),
            Self::BinaryCrossEntropy => f.write_str("BinaryCrossEntropy"),
            Self::Custom { .. } => f.write_str("Custom"),
        }
    }
}

fn check_shapes(recon: &Array2<f32>, target: &Array2<f32>) -> Result<()> {
    if recon.dim() != target.dim() {
        return Err(Error::ShapeMismatch {
            expected: recon.dim(),
            found: target.dim(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_least_squares_value() {
        let b = array![[1.0, 2.0], [3.0, 4.0]];
        let a = array![[0.0, 0.0], [0.0, 0.0]];

        let loss = Loss::LeastSquares.value(&b, &a).unwrap();
        assert!((loss - 30.0).abs() < 1e-6); // 1 + 4 + 9 + 16
    }

    #[test]
    fn test_least_squares_gradient() {
        let b = array![[1.0, 2.0], [3.0, 4.0]];
        let a = array![[1.0, 0.0], [0.0, 1.0]];

        let grad = Loss::LeastSquares.gradient(&b, &a).unwrap();
        assert_eq!(grad, array![[0.0, 4.0], [6.0, 6.0]]);
    }

    #[test]
    fn test_shape_mismatch() {
        let b = Array2::<f32>::zeros((2, 2));
        let a = Array2::<f32>::zeros((3, 3));

        assert!(matches!(
            Loss::LeastSquares.value(&b, &a),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(matches!(
            Loss::LeastSquares.gradient(&b, &a),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_cross_entropy_finite_at_extremes() {
        // Saturated reconstructions must not produce infinite loss
        let b = array![[0.0, 1.0], [0.5, 0.5]];
        let a = array![[1.0, 0.0], [1.0, 0.0]];

        let loss = Loss::BinaryCrossEntropy.value(&b, &a).unwrap();
        assert!(loss.is_finite());

        let grad = Loss::BinaryCrossEntropy.gradient(&b, &a).unwrap();
        assert!(grad.iter().all(|g| g.is_finite()));
    }

    #[test]
    fn test_cross_entropy_known_value() {
        let b = array![[0.5, 0.5], [0.5, 0.5]];
        let a = array![[1.0, 0.0], [0.0, 1.0]];

        let loss = Loss::BinaryCrossEntropy.value(&b, &a).unwrap();
        // Every entry contributes -ln(0.5)
        assert!((loss - 4.0 * std::f32::consts::LN_2).abs() < 1e-5);
    }

    #[test]
    fn test_cross_entropy_gradient_sign() {
        // Under-predicting a link gives a negative gradient (push B up),
        // over-predicting a non-link gives a positive one (push B down).
        let b = array![[0.2, 0.8]];
        let a = array![[1.0, 0.0]];

        let grad = Loss::BinaryCrossEntropy.gradient(&b, &a).unwrap();
        assert!(grad[[0, 0]] < 0.0);
        assert!(grad[[0, 1]] > 0.0);
    }

    #[test]
    fn test_custom_loss_dispatch() {
        let loss = Loss::Custom {
            value: Arc::new(|b, a| (b - a).mapv(f32::abs).sum()),
            gradient: Arc::new(|b, a| (b - a).mapv(f32::signum)),
        };

        let b = array![[2.0, -1.0]];
        let a = array![[0.0, 0.0]];

        assert!((loss.value(&b, &a).unwrap() - 3.0).abs() < 1e-6);
        assert_eq!(loss.gradient(&b, &a).unwrap(), array![[1.0, -1.0]]);
    }
}

//! Pseudo-inverses for symmetric positive semi-definite matrices.
//!
//! Every matrix the estimator inverts (moment covariance, weighted Gram
//! matrices, projection Gram matrices) is symmetric PSD and may be singular:
//! too few control units for the moment count, a just-identified model, or
//! collinear factor rows. [`pinv_symmetric`] inverts the non-null part of the
//! spectrum and reports the retained rank so callers can log the truncation.
//!
//! # Provided items
//! - [`PseudoInverse`]: the inverse plus its numerical rank.
//! - [`pinv_symmetric`]: eigen-truncated Moore–Penrose inverse.
//! - [`eigen_cutoff`]: the relative eigenvalue threshold used.
use nalgebra::DMatrix;
use ndarray::{Array2, ArrayView2};

/// Moore–Penrose inverse of a symmetric matrix and its numerical rank.
#[derive(Debug, Clone, PartialEq)]
pub struct PseudoInverse {
    pub matrix: Array2<f64>,
    pub rank: usize,
}

impl PseudoInverse {
    /// `true` when no eigenvalue was truncated.
    pub fn is_full_rank(&self) -> bool {
        self.rank == self.matrix.nrows()
    }
}

/// Eigenvalue threshold below which a direction is treated as null.
///
/// `max(n, 1) · ε · |λ_max|`, or `+∞` when `|λ_max|` is itself below the
/// smallest normal `f64` (the matrix is numerically zero).
pub fn eigen_cutoff(n: usize, lambda_max_abs: f64) -> f64 {
    if !(lambda_max_abs >= f64::MIN_POSITIVE) {
        return f64::INFINITY;
    }
    (n.max(1) as f64) * f64::EPSILON * lambda_max_abs
}

/// pinv_symmetric — eigen-truncated pseudo-inverse of a symmetric matrix.
///
/// Parameters
/// ----------
/// - `a`: `ArrayView2<f64>`
///   Square matrix. It is symmetrized as `(A + Aᵀ)/2` before the
///   eigen-decomposition so round-off asymmetry does not leak into the
///   spectrum.
///
/// Returns
/// -------
/// `PseudoInverse`
///   `A⁺ = Σ_{λ_k > cutoff} q_k q_kᵀ / λ_k` and the count of retained
///   eigenvalues. An empty `0 × 0` input yields an empty inverse of rank 0.
///
/// Notes
/// -----
/// - Non-positive eigenvalues are always discarded, matching the PSD use
///   case.
/// - The caller is responsible for passing a square matrix; shapes are
///   produced internally by the estimator, never by user input.
pub fn pinv_symmetric(a: ArrayView2<f64>) -> PseudoInverse {
    let n = a.nrows();
    if n == 0 {
        return PseudoInverse { matrix: Array2::zeros((0, 0)), rank: 0 };
    }
    let sym = to_symmetric_dmatrix(a);
    let eigen = sym.symmetric_eigen();
    let lambda_max = eigen.eigenvalues.iter().fold(0.0_f64, |m, &l| m.max(l.abs()));
    let cutoff = eigen_cutoff(n, lambda_max);

    let q = &eigen.eigenvectors;
    let mut matrix = Array2::<f64>::zeros((n, n));
    let mut rank = 0;
    for (k, &lambda) in eigen.eigenvalues.iter().enumerate() {
        if lambda <= cutoff {
            continue;
        }
        rank += 1;
        let inv = 1.0 / lambda;
        for i in 0..n {
            let qi = q[(i, k)] * inv;
            for j in 0..n {
                matrix[[i, j]] += qi * q[(j, k)];
            }
        }
    }
    PseudoInverse { matrix, rank }
}

// ---- Helper methods ----

fn to_symmetric_dmatrix(a: ArrayView2<f64>) -> DMatrix<f64> {
    let n = a.nrows();
    DMatrix::from_fn(n, n, |i, j| 0.5 * (a[[i, j]] + a[[j, i]]))
}

//! Factor matrix construction from the free loading parameters.
//!
//! With `p` factors over `T` periods the factor matrix `F̂` is `T × p`: a
//! free `(T − p) × p` block stacked over `−I_p`, so the last `p` periods pin
//! down the rotation. `θ` stores the free block column by column:
//! `F̂[t, j] = θ[j · (T − p) + t]` for `t < T − p`.
use crate::factor_model::errors::{FactorError, FactorResult};
use crate::optimization::minimizer::Theta;
use ndarray::{Array2, ArrayView2, s};

/// Number of free loading parameters for `p` factors over `T` periods.
pub fn n_loading_params(p: usize, n_periods: usize) -> usize {
    n_periods.saturating_sub(p) * p
}

/// `T × p` factor matrix with normalized trailing block.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorMatrix {
    p: usize,
    fhat: Array2<f64>,
}

impl FactorMatrix {
    /// Build `F̂` from `θ`.
    ///
    /// # Errors
    /// - `FactorError::InvalidFactorCount` if `p ≥ T`.
    /// - `FactorError::ThetaLengthMismatch` if `θ.len() ≠ (T − p) · p`.
    pub fn from_theta(theta: &Theta, p: usize, n_periods: usize) -> FactorResult<Self> {
        if p >= n_periods {
            return Err(FactorError::InvalidFactorCount {
                p,
                n_periods,
                reason: "factor count must be smaller than the number of periods",
            });
        }
        let expected = n_loading_params(p, n_periods);
        if theta.len() != expected {
            return Err(FactorError::ThetaLengthMismatch { expected, found: theta.len() });
        }
        let free = n_periods - p;
        let mut fhat = Array2::<f64>::zeros((n_periods, p));
        for j in 0..p {
            for t in 0..free {
                fhat[[t, j]] = theta[j * free + t];
            }
            fhat[[free + j, j]] = -1.0;
        }
        Ok(Self { p, fhat })
    }

    pub fn n_factors(&self) -> usize {
        self.p
    }

    pub fn n_periods(&self) -> usize {
        self.fhat.nrows()
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.fhat.view()
    }

    /// First `rows` periods of `F̂`.
    pub fn leading(&self, rows: usize) -> ArrayView2<'_, f64> {
        self.fhat.slice(s![..rows, ..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // θ fills the free block column-major above a trailing −I block.
    //
    // Given
    // -----
    // - T = 4, p = 2, θ = (1, 2, 3, 4); T = 4, p = 1, θ = (10, 20, 30).
    //
    // Expect
    // ------
    // - F̂ = [[1, 3], [2, 4], [−1, 0], [0, −1]].
    // - F̂ = (10, 20, 30, −1)ᵀ.
    fn from_theta_stacks_free_block_over_identity() {
        // Act
        let two = FactorMatrix::from_theta(&array![1.0, 2.0, 3.0, 4.0], 2, 4).expect("valid");
        let one = FactorMatrix::from_theta(&array![10.0, 20.0, 30.0], 1, 4).expect("valid");

        // Assert
        assert_eq!(two.view(), array![[1.0, 3.0], [2.0, 4.0], [-1.0, 0.0], [0.0, -1.0]]);
        assert_eq!(two.leading(1), array![[1.0, 3.0]]);
        assert_eq!(one.view(), array![[10.0], [20.0], [30.0], [-1.0]]);
    }

    #[test]
    // Purpose
    // -------
    // Length and range violations are rejected.
    //
    // Given
    // -----
    // - T = 3, p = 1 with θ of length 3; p = 3 with empty θ.
    //
    // Expect
    // ------
    // - `ThetaLengthMismatch { expected: 2, found: 3 }` and `InvalidFactorCount`.
    fn from_theta_validates_shapes() {
        // Act / Assert
        assert_eq!(
            FactorMatrix::from_theta(&array![0.0, 0.0, 0.0], 1, 3),
            Err(FactorError::ThetaLengthMismatch { expected: 2, found: 3 })
        );
        assert!(matches!(
            FactorMatrix::from_theta(&Theta::zeros(0), 3, 3),
            Err(FactorError::InvalidFactorCount { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Zero factors give an empty `T × 0` matrix.
    //
    // Given
    // -----
    // - T = 5, p = 0, θ empty.
    //
    // Expect
    // ------
    // - Shape (5, 0).
    fn from_theta_with_zero_factors_is_empty() {
        // Act
        let f = FactorMatrix::from_theta(&Theta::zeros(0), 0, 5).expect("valid");

        // Assert
        assert_eq!(f.view().dim(), (5, 0));
        assert_eq!(n_loading_params(0, 5), 0);
    }
}

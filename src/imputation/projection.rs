//! Counterfactual projection through the factor structure.
//!
//! A unit first treated after `shift` observed periods has untreated
//! outcomes only in rows `0..shift`. Writing `F_g` for those rows of `F̂`,
//! the least-squares loading estimate is `λ̂ = (F_gᵀF_g)⁺ F_gᵀ y[..shift]`
//! and the imputed path is `F̂ λ̂`. [`GroupProjection`] stores the composite
//! `T × shift` operator `F̂ (F_gᵀF_g)⁺ F_gᵀ` so it is built once per group.
use crate::factor_model::FactorMatrix;
use crate::optimization::numerical_stability::pinv_symmetric;
use ndarray::{Array1, Array2, ArrayView1, s};

#[derive(Debug, Clone, PartialEq)]
pub struct GroupProjection {
    shift: usize,
    operator: Array2<f64>,
}

impl GroupProjection {
    /// Build the projection for units observed untreated over `0..shift`.
    ///
    /// A rank-deficient `F_gᵀF_g` is inverted on its range and logged.
    pub fn new(factors: &FactorMatrix, shift: usize) -> Self {
        let leading = factors.leading(shift);
        let gram = leading.t().dot(&leading);
        let inverse = pinv_symmetric(gram.view());
        if !inverse.is_full_rank() {
            log::warn!(
                "projection Gram matrix over {shift} periods has rank {} of {}; using pseudo-inverse",
                inverse.rank,
                factors.n_factors()
            );
        }
        let operator = factors.view().dot(&inverse.matrix).dot(&leading.t());
        Self { shift, operator }
    }

    pub fn shift(&self) -> usize {
        self.shift
    }

    pub fn operator(&self) -> &Array2<f64> {
        &self.operator
    }

    /// Imputed untreated path (length `T`) from a full outcome path.
    pub fn impute(&self, path: ArrayView1<f64>) -> Array1<f64> {
        self.operator.dot(&path.slice(s![..self.shift]))
    }
}

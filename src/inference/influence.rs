//! inference::influence — two-stage influence function of the cell effects.
//!
//! Purpose
//! -------
//! Linearize `τ̂` around the truth as a sum of per-unit contributions,
//! `τ̂ − τ ≈ Σ_i IF_i`, accounting for the estimated factor loadings.
//!
//! Key behaviors
//! -------------
//! - Direct part: `ms_i / N`, from [`ms_tau_gt`](crate::imputation::ms_tau_gt).
//! - Loading part: `D · φ_i`, where `D = ∂ mean_i ms_i(θ, τ̂) / ∂θ` is a
//!   central-difference Jacobian (`cells × params`) and
//!   `φ_c = −(MᵀWM)⁺ MᵀW m_c / N0` is the GMM influence of control `c`
//!   (zero for treated units).
//! - `IFᵀ IF` is the covariance of `τ̂`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `ms` rows and `loading_influence` rows are both indexed by panel unit.
//! - With zero factors both parts of the loading term are empty and the
//!   influence function is the direct part alone.
use crate::factor_model::FactorFit;
use crate::imputation::ms_tau_gt;
use crate::inference::errors::{InferenceError, InferenceResult};
use crate::optimization::{
    minimizer::{Jacobian, Theta, central_jacobian},
    numerical_stability::pinv_symmetric,
};
use crate::panel::CellLayout;
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// loading_influence — per-unit influence of the GMM loadings.
///
/// Returns an `N × P` matrix whose rows for `controls` hold
/// `−(MᵀWM)⁺ MᵀW m_c / N0` evaluated at `θ̂`; all other rows are zero.
///
/// # Errors
/// - `InferenceError::DimensionMismatch` if `controls` does not match the
///   number of control units in `fit`.
/// - Factor-model errors from evaluating the unit moments.
pub fn loading_influence(
    fit: &FactorFit, controls: &[usize], n_units: usize,
) -> InferenceResult<Array2<f64>> {
    let n_controls = fit.moments.n_controls();
    if controls.len() != n_controls {
        return Err(InferenceError::DimensionMismatch {
            what: "control index list",
            expected: n_controls,
            found: controls.len(),
        });
    }
    let m = fit.moments.jacobian();
    let mt_w = m.t().dot(&fit.weight);
    let gram = pinv_symmetric(mt_w.dot(m).view());
    if !gram.is_full_rank() {
        log::warn!(
            "GMM Gram matrix has rank {} of {}; using pseudo-inverse",
            gram.rank,
            m.ncols()
        );
    }
    let sandwich = gram.matrix.dot(&mt_w);

    let unit_moments = fit.moments.unit_moments(&fit.theta)?;
    let per_control = unit_moments.dot(&sandwich.t()) / -(n_controls as f64);

    let mut phi = Array2::<f64>::zeros((n_units, fit.theta.len()));
    for (row, &unit) in controls.iter().enumerate() {
        phi.row_mut(unit).assign(&per_control.row(row));
    }
    Ok(phi)
}

/// cross_stage_jacobian — `∂ mean_i ms_i(θ, τ) / ∂θ` at `θ`.
///
/// Differences [`ms_tau_gt`] with `τ` held fixed, using central steps
/// `h_j = ∛ε · max(1, |θ_j|)`. The result is `cells × P`.
///
/// # Errors
/// Imputation errors raised while evaluating the moments, and non-finite
/// Jacobian entries.
pub fn cross_stage_jacobian(
    theta: &Theta, tau: &Array1<f64>, p: usize, outcomes: ArrayView2<f64>, cells: &CellLayout,
) -> InferenceResult<Jacobian> {
    let mean_moments = |t: &Theta| -> InferenceResult<Array1<f64>> {
        let ms = ms_tau_gt(t, tau, p, outcomes, cells)?;
        Ok(ms.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(ms.ncols())))
    };
    central_jacobian(&mean_moments, theta)
}

/// influence_function — direct plus propagated influence, `N × cells`.
///
/// `stage_one` is `(D, φ)`; pass `None` to ignore loading uncertainty.
///
/// # Errors
/// `InferenceError::DimensionMismatch` when `D`, `φ`, and `ms` disagree.
pub fn influence_function(
    ms: ArrayView2<f64>, stage_one: Option<(&Jacobian, &Array2<f64>)>,
) -> InferenceResult<Array2<f64>> {
    let n_units = ms.nrows();
    if n_units == 0 {
        return Err(InferenceError::EmptyInfluence);
    }
    let mut influence = ms.to_owned() / n_units as f64;
    if let Some((jacobian, phi)) = stage_one {
        if jacobian.nrows() != ms.ncols() {
            return Err(InferenceError::DimensionMismatch {
                what: "cross-stage jacobian rows",
                expected: ms.ncols(),
                found: jacobian.nrows(),
            });
        }
        if phi.dim() != (n_units, jacobian.ncols()) {
            return Err(InferenceError::DimensionMismatch {
                what: "loading influence rows",
                expected: n_units,
                found: phi.nrows(),
            });
        }
        influence += &phi.dot(&jacobian.t());
    }
    Ok(influence)
}

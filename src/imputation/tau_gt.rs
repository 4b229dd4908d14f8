//! imputation::tau_gt — group-time effects from imputed counterfactuals.
//!
//! Purpose
//! -------
//! Given loadings `θ` for a `p`-factor model, impute every treated unit's
//! untreated path from its own pre-adoption outcomes and average the
//! realized-minus-imputed gaps within (cohort, period) cells.
//!
//! Key behaviors
//! -------------
//! - [`estimate_tau_gt`]: cell means of the gaps over cohort members.
//! - [`impute_y0`]: the imputed `T × N` matrix. Never-treated units are
//!   projected from the common pre-treatment window.
//! - [`ms_tau_gt`]: per-unit cell moments `(gap − τ) / π_g`, where
//!   `π_g = N_g / N` is the cohort's share of the sample. The column means
//!   of this matrix are zero at `τ = τ̂`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `outcomes` is `T × N` and matches the [`CellLayout`].
//! - Never-treated units never enter `τ` or its moments; they are
//!   identified by [`CellLayout::unit_group`] returning `None`.
//! - All three functions are pure in `θ`, so they can be differenced
//!   numerically.
use crate::factor_model::{FactorError, FactorMatrix, FactorResult};
use crate::imputation::projection::GroupProjection;
use crate::optimization::minimizer::Theta;
use crate::panel::CellLayout;
use ndarray::{Array1, Array2, ArrayView2};

/// estimate_tau_gt — average treatment effect per (cohort, period) cell.
///
/// Parameters
/// ----------
/// - `theta`, `p`: loadings of the factor model, `θ.len() = (T − p) · p`.
/// - `outcomes`: `T × N` outcome matrix.
/// - `cells`: cohort membership and adoption shifts.
///
/// Returns
/// -------
/// `Array1<f64>` of length `G · T` in cell order (`group · T + t`).
///
/// Errors
/// ------
/// - `FactorError::LayoutMismatch` for an outcome matrix of the wrong shape.
/// - Errors from [`FactorMatrix::from_theta`].
pub fn estimate_tau_gt(
    theta: &Theta, p: usize, outcomes: ArrayView2<f64>, cells: &CellLayout,
) -> FactorResult<Array1<f64>> {
    let gaps = treated_gaps(theta, p, outcomes, cells)?;
    let n_periods = cells.n_periods();
    let mut tau = Array1::<f64>::zeros(cells.n_cells());
    for (g, group) in cells.groups().iter().enumerate() {
        let n_g = group.members.len() as f64;
        for t in 0..n_periods {
            let sum: f64 = group.members.iter().map(|&i| gaps[[t, i]]).sum();
            tau[cells.cell(g, t)] = sum / n_g;
        }
    }
    Ok(tau)
}

/// impute_y0 — imputed untreated outcomes for every unit.
///
/// Treated units use their cohort's projection; never-treated units use the
/// projection over the first `pre_periods` periods.
///
/// # Errors
/// As [`estimate_tau_gt`].
pub fn impute_y0(
    theta: &Theta, p: usize, outcomes: ArrayView2<f64>, cells: &CellLayout,
    pre_periods: usize,
) -> FactorResult<Array2<f64>> {
    check_layout(outcomes, cells)?;
    let factors = FactorMatrix::from_theta(theta, p, cells.n_periods())?;
    let projections = group_projections(&factors, cells);
    let control_projection = GroupProjection::new(&factors, pre_periods);

    let mut imputed = Array2::<f64>::zeros(outcomes.dim());
    for i in 0..cells.n_units() {
        let proj = match cells.unit_group(i) {
            Some(g) => &projections[g],
            None => &control_projection,
        };
        imputed.column_mut(i).assign(&proj.impute(outcomes.column(i)));
    }
    Ok(imputed)
}

/// ms_tau_gt — per-unit moment contributions of the cell effects.
///
/// Parameters
/// ----------
/// - `theta`, `p`, `outcomes`, `cells`: as in [`estimate_tau_gt`].
/// - `tau`: cell effects to center on, length `G · T`.
///
/// Returns
/// -------
/// `Array2<f64>` of shape `N × (G · T)`. Row `i` is zero outside unit `i`'s
/// cohort; inside it, entry `t` is `(gap_i[t] − τ[cell]) · N / N_g`.
///
/// Errors
/// ------
/// - `FactorError::CellCountMismatch` if `tau` has the wrong length.
/// - As [`estimate_tau_gt`] otherwise.
pub fn ms_tau_gt(
    theta: &Theta, tau: &Array1<f64>, p: usize, outcomes: ArrayView2<f64>, cells: &CellLayout,
) -> FactorResult<Array2<f64>> {
    if tau.len() != cells.n_cells() {
        return Err(FactorError::CellCountMismatch { expected: cells.n_cells(), found: tau.len() });
    }
    let gaps = treated_gaps(theta, p, outcomes, cells)?;
    let n_units = cells.n_units();
    let mut ms = Array2::<f64>::zeros((n_units, cells.n_cells()));
    for (g, group) in cells.groups().iter().enumerate() {
        let inv_share = n_units as f64 / group.members.len() as f64;
        for &i in &group.members {
            for t in 0..cells.n_periods() {
                let cell = cells.cell(g, t);
                ms[[i, cell]] = (gaps[[t, i]] - tau[cell]) * inv_share;
            }
        }
    }
    Ok(ms)
}

// ---- Helper methods ----

/// Realized minus imputed outcomes; never-treated columns stay zero.
fn treated_gaps(
    theta: &Theta, p: usize, outcomes: ArrayView2<f64>, cells: &CellLayout,
) -> FactorResult<Array2<f64>> {
    check_layout(outcomes, cells)?;
    let factors = FactorMatrix::from_theta(theta, p, cells.n_periods())?;
    let projections = group_projections(&factors, cells);

    let mut gaps = Array2::<f64>::zeros(outcomes.dim());
    for (group, proj) in cells.groups().iter().zip(&projections) {
        for &i in &group.members {
            let path = outcomes.column(i);
            let gap = &path - &proj.impute(path);
            gaps.column_mut(i).assign(&gap);
        }
    }
    Ok(gaps)
}

fn group_projections(factors: &FactorMatrix, cells: &CellLayout) -> Vec<GroupProjection> {
    cells.groups().iter().map(|g| GroupProjection::new(factors, g.shift)).collect()
}

fn check_layout(outcomes: ArrayView2<f64>, cells: &CellLayout) -> FactorResult<()> {
    let expected = (cells.n_periods(), cells.n_units());
    if outcomes.dim() != expected {
        return Err(FactorError::LayoutMismatch { expected, found: outcomes.dim() });
    }
    Ok(())
}

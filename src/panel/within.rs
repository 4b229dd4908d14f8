//! Within transformation of the outcome matrix.
//!
//! Three passes over a `periods × units` matrix, each statistic computed from
//! the matrix as left by the previous pass:
//!
//! 1. subtract the never-treated cross-sectional mean of each period;
//! 2. subtract each unit's mean over the pre-treatment window;
//! 3. add back the never-treated mean over the pre-treatment window.
//!
//! The matrix is taken by value and returned transformed; callers that need
//! the untransformed outcomes clone before calling.
use ndarray::{Array2, Axis, s};

/// within_transform — remove period effects and pre-period unit levels.
///
/// Parameters
/// ----------
/// - `outcomes`: `Array2<f64>` of shape `(T, N)`, consumed.
/// - `controls`: column indices of never-treated units (non-empty).
/// - `pre_periods`: length of the common pre-treatment window `T0`
///   (`1 ≤ T0 ≤ T`).
///
/// Returns
/// -------
/// The transformed matrix, same shape as the input.
///
/// Notes
/// -----
/// - Step 2 uses only rows `0..T0`, so post-treatment outcomes never feed
///   the unit means.
/// - When the control outcomes are constant over the pre-treatment window,
///   those control cells are exactly zero afterwards.
pub fn within_transform(
    mut outcomes: Array2<f64>, controls: &[usize], pre_periods: usize,
) -> Array2<f64> {
    if controls.is_empty() || pre_periods == 0 {
        return outcomes;
    }
    let n_controls = controls.len() as f64;

    // 1. period means across never-treated units
    let period_means = outcomes.select(Axis(1), controls).sum_axis(Axis(1)) / n_controls;
    for mut col in outcomes.columns_mut() {
        col -= &period_means;
    }

    // 2. unit means over the pre-treatment window
    let unit_pre_means = outcomes.slice(s![..pre_periods, ..]).sum_axis(Axis(0)) / pre_periods as f64;
    for mut row in outcomes.rows_mut() {
        row -= &unit_pre_means;
    }

    // 3. never-treated grand mean over the pre-treatment window
    let grand = controls
        .iter()
        .map(|&c| outcomes.slice(s![..pre_periods, c]).sum())
        .sum::<f64>()
        / (n_controls * pre_periods as f64);
    outcomes += grand;
    outcomes
}

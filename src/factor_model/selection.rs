//! Sequential factor-count selection by the overidentification test.
//!
//! Candidates `p = 0, 1, …, max_p` are fitted in order and the first one
//! whose J-test p-value exceeds the threshold is accepted. If none does, the
//! largest candidate is used and a warning is logged.
use crate::factor_model::{
    errors::FactorResult,
    gmm::{FactorFit, GmmOptions, fit_factor_model},
};
use ndarray::ArrayView2;

/// One evaluated candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionStep {
    pub p: usize,
    pub j_stat: f64,
    pub df: usize,
    pub p_value: f64,
}

/// Outcome of [`select_factor_count`].
#[derive(Debug, Clone, PartialEq)]
pub struct FactorSelection {
    pub fit: FactorFit,
    /// Every candidate evaluated, in order.
    pub path: Vec<SelectionStep>,
    /// `false` when no candidate passed and the largest was kept.
    pub accepted: bool,
}

/// Pick the smallest `p ≤ max_p` not rejected at `pvalue_threshold`.
///
/// # Errors
/// Any error from [`fit_factor_model`] for an evaluated candidate.
pub fn select_factor_count(
    outcomes: ArrayView2<f64>, instruments: ArrayView2<f64>, max_p: usize,
    pvalue_threshold: f64, opts: &GmmOptions,
) -> FactorResult<FactorSelection> {
    let mut path = Vec::with_capacity(max_p + 1);
    let mut p = 0;
    loop {
        let fit = fit_factor_model(p, outcomes, instruments, opts)?;
        path.push(SelectionStep { p, j_stat: fit.j_stat, df: fit.df, p_value: fit.p_value });
        log::debug!("factor selection: p = {p}, J = {:.4}, p-value = {:.4}", fit.j_stat, fit.p_value);

        if fit.p_value > pvalue_threshold {
            return Ok(FactorSelection { fit, path, accepted: true });
        }
        if p == max_p {
            log::warn!(
                "no factor count up to {max_p} passes the J test at {pvalue_threshold}; using p = {max_p}"
            );
            return Ok(FactorSelection { fit, path, accepted: false });
        }
        p += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Search order, stopping rule, and the exhausted-search fallback.
    // -------------------------------------------------------------------------

    fn one_factor_controls(n: usize) -> (Array2<f64>, Array2<f64>) {
        let f = [-1.0, 1.5, 0.5, 3.0, -2.0];
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let mut y = Array2::<f64>::zeros((5, n));
        let mut z = Array2::<f64>::zeros((n, 2));
        for c in 0..n {
            let lambda = 2.0 + rng.gen_range(-1.0..1.0);
            for t in 0..5 {
                y[[t, c]] = f[t] * lambda + 0.05 * rng.gen_range(-1.0..1.0);
            }
            z[[c, 0]] = 1.0;
            z[[c, 1]] = lambda + 0.2 * rng.gen_range(-1.0..1.0);
        }
        (y, z)
    }

    #[test]
    // Purpose
    // -------
    // The search starts at zero and stops at the first non-rejected count.
    //
    // Given
    // -----
    // - A one-factor panel with strong factor signal; max_p = 2; threshold 0.05.
    //
    // Expect
    // ------
    // - p = 0 is rejected; the path starts at 0 and is increasing.
    // - The selected count is the last path entry and passes the threshold.
    fn selection_stops_at_first_passing_candidate() {
        // Arrange
        let (y, z) = one_factor_controls(300);

        // Act
        let sel = select_factor_count(y.view(), z.view(), 2, 0.05, &GmmOptions::default())
            .expect("selection");

        // Assert
        assert_eq!(sel.path[0].p, 0);
        assert!(sel.path[0].p_value <= 0.05);
        assert!(sel.path.windows(2).all(|w| w[1].p == w[0].p + 1));
        let last = sel.path[sel.path.len() - 1];
        assert_eq!(last.p, sel.fit.n_factors());
        assert!(sel.accepted);
        assert!(last.p_value > 0.05);
    }

    #[test]
    // Purpose
    // -------
    // An exhausted search keeps the largest candidate and flags it.
    //
    // Given
    // -----
    // - The same panel with max_p = 0.
    //
    // Expect
    // ------
    // - One path entry, p = 0, `accepted == false`.
    fn exhausted_selection_keeps_largest_candidate() {
        // Arrange
        let (y, z) = one_factor_controls(300);

        // Act
        let sel = select_factor_count(y.view(), z.view(), 0, 0.05, &GmmOptions::default())
            .expect("selection");

        // Assert
        assert_eq!(sel.path.len(), 1);
        assert_eq!(sel.fit.n_factors(), 0);
        assert!(!sel.accepted);
    }
}

//! inference::bootstrap — multiplier bootstrap for uniform confidence bands.
//!
//! Purpose
//! -------
//! Resample an `N × K` influence-function matrix with Rademacher weights to
//! obtain robust per-parameter standard errors and a single sup-t critical
//! value valid simultaneously for all `K` parameters.
//!
//! Key behaviors
//! -------------
//! - Draw `b` is `Σ_i w_bi · IF_i` with `w_bi = ±1` equiprobable. Weight
//!   rows are generated in parallel, each from its own generator seeded
//!   `seed + b`, so the result does not depend on the thread count.
//! - Standard error = IQR of the draws / IQR of the standard normal.
//! - Critical value = the `confidence` quantile over draws of
//!   `max_k |draw_k / se_k|`.
//!
//! Conventions
//! -----------
//! - Quantiles interpolate linearly between order statistics (type 7).
//! - Parameters with a zero or non-finite standard error are left out of
//!   the sup-t maximum. If every parameter is left out, the critical value
//!   is the pointwise normal quantile `z_{(1 + confidence)/2}`.
use crate::inference::errors::{InferenceError, InferenceResult};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use statrs::distribution::{ContinuousCDF, Normal};

/// Minimum number of bootstrap rows per parallel task.
const MIN_CHUNK_SIZE: usize = 64;

/// Standard errors and sup-t critical value from [`multiplier_bootstrap`].
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBand {
    pub std_errors: Array1<f64>,
    pub critical_value: f64,
}

/// multiplier_bootstrap — Rademacher multiplier bootstrap.
///
/// Parameters
/// ----------
/// - `influence`: `N × K` influence-function matrix on the sum scale
///   (`Var ≈ IFᵀ IF`).
/// - `draws`: number of bootstrap draws `B ≥ 1`.
/// - `confidence`: band level in `(0, 1)`.
/// - `seed`: base seed; draw `b` uses `seed + b`.
///
/// Returns
/// -------
/// [`UniformBand`] with `K` standard errors and one critical value.
///
/// Errors
/// ------
/// - `InvalidDraws`, `InvalidConfidence` for bad settings.
/// - `EmptyInfluence` when `N = 0`; `NonFiniteInfluence` for NaN or ±∞.
pub fn multiplier_bootstrap(
    influence: ArrayView2<f64>, draws: usize, confidence: f64, seed: u64,
) -> InferenceResult<UniformBand> {
    validate_inputs(influence, draws, confidence)?;
    let normal = standard_normal()?;
    let normal_iqr = normal.inverse_cdf(0.75) - normal.inverse_cdf(0.25);

    let weights = rademacher_weights(draws, influence.nrows(), seed);
    let boot = weights.dot(&influence);

    let std_errors: Array1<f64> = boot
        .axis_iter(Axis(1))
        .map(|col| {
            let sorted = sorted(col.iter().copied());
            (quantile_sorted(&sorted, 0.75) - quantile_sorted(&sorted, 0.25)) / normal_iqr
        })
        .collect();

    let active: Vec<usize> =
        (0..std_errors.len()).filter(|&k| std_errors[k].is_finite() && std_errors[k] > 0.0).collect();
    if active.is_empty() {
        let fallback = normal.inverse_cdf((1.0 + confidence) / 2.0);
        log::warn!(
            "all {} bootstrap standard errors are degenerate; using pointwise critical value {fallback:.4}",
            std_errors.len()
        );
        return Ok(UniformBand { std_errors, critical_value: fallback });
    }

    let sup_t = sorted(boot.axis_iter(Axis(0)).map(|row| {
        active.iter().map(|&k| (row[k] / std_errors[k]).abs()).fold(0.0_f64, f64::max)
    }));
    let critical_value = quantile_sorted(&sup_t, confidence);
    Ok(UniformBand { std_errors, critical_value })
}

/// Type-7 quantile of an ascending, non-empty slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    let h = (n - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

// ---- Helper methods ----

/// `draws × n` matrix of ±1 weights, one generator per row.
fn rademacher_weights(draws: usize, n: usize, seed: u64) -> Array2<f64> {
    let mut weights = Array2::<f64>::zeros((draws, n));
    weights
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .with_min_len(MIN_CHUNK_SIZE)
        .enumerate()
        .for_each(|(b, mut row)| {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed.wrapping_add(b as u64));
            for elem in row.iter_mut() {
                *elem = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            }
        });
    weights
}

fn sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut v: Vec<f64> = values.collect();
    v.sort_by(f64::total_cmp);
    v
}

fn standard_normal() -> InferenceResult<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| InferenceError::Distribution { reason: e.to_string() })
}

fn validate_inputs(influence: ArrayView2<f64>, draws: usize, confidence: f64) -> InferenceResult<()> {
    if draws == 0 {
        return Err(InferenceError::InvalidDraws { draws, reason: "at least one draw is required" });
    }
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(InferenceError::InvalidConfidence {
            level: confidence,
            reason: "must lie strictly between 0 and 1",
        });
    }
    if influence.nrows() == 0 {
        return Err(InferenceError::EmptyInfluence);
    }
    if let Some(((row, col), &value)) = influence.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(InferenceError::NonFiniteInfluence { row, col, value });
    }
    Ok(())
}

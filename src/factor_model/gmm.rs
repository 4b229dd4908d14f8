//! factor_model::gmm — two-step GMM for the factor loadings and the J test.
//!
//! Purpose
//! -------
//! Estimate `θ` (the free block of `F̂`) from control units by minimizing
//! `m̄(θ)ᵀ W m̄(θ)` twice: first with `W = I`, then with `W = S⁺`, where `S`
//! is the centered covariance of the unit moments at the first-step
//! estimate. The second step starts from the first-step solution.
//!
//! Key behaviors
//! -------------
//! - Both steps run through [`minimize`] with an analytic gradient.
//! - `J = N0 · m̄(θ̂)ᵀ W m̄(θ̂)` is referred to a χ² with `L − p` degrees
//!   of freedom. With zero degrees of freedom the p-value is exactly 1.
//! - Non-convergence is handled by [`ConvergencePolicy`].
//!
//! Conventions
//! -----------
//! - `S` uses the `1/N0` divisor, so a single control unit gives `S = 0`,
//!   `W = 0`, and the first-step estimate is kept.
use crate::factor_model::{
    errors::{FactorError, FactorResult},
    factors::FactorMatrix,
    moments::FactorMoments,
};
use crate::optimization::{
    errors::OptError,
    minimizer::{MinimizerOptions, OptimOutcome, Theta, minimize},
    numerical_stability::pinv_symmetric,
};
use ndarray::{Array2, ArrayView2};
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// What to do when an optimizer stage stops without converging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvergencePolicy {
    /// Fail with `OptError::NotConverged`.
    #[default]
    Error,
    /// Log a warning and keep the last iterate.
    Warn,
}

impl ConvergencePolicy {
    /// Apply the policy to one optimizer outcome.
    pub fn enforce(&self, outcome: &OptimOutcome, stage: &str) -> FactorResult<()> {
        if outcome.converged {
            return Ok(());
        }
        match self {
            ConvergencePolicy::Error => Err(OptError::NotConverged {
                status: outcome.status.clone(),
                iterations: outcome.iterations,
            }
            .into()),
            ConvergencePolicy::Warn => {
                log::warn!(
                    "{stage} GMM step did not converge after {} iterations ({}); keeping last iterate",
                    outcome.iterations,
                    outcome.status
                );
                Ok(())
            }
        }
    }
}

/// Optimizer settings shared by both GMM steps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GmmOptions {
    pub minimizer: MinimizerOptions,
    pub convergence: ConvergencePolicy,
}

/// Fitted `p`-factor model.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorFit {
    /// Second-step loadings.
    pub theta: Theta,
    /// Second-step weighting matrix `S⁺`.
    pub weight: Array2<f64>,
    pub moments: FactorMoments,
    pub j_stat: f64,
    pub df: usize,
    pub p_value: f64,
    pub first_step: OptimOutcome,
    pub second_step: OptimOutcome,
}

impl FactorFit {
    pub fn n_factors(&self) -> usize {
        self.moments.n_factors()
    }

    /// `F̂` at the second-step estimate.
    pub fn factors(&self) -> FactorResult<FactorMatrix> {
        FactorMatrix::from_theta(&self.theta, self.n_factors(), self.moments.n_periods())
    }
}

/// fit_factor_model — two-step GMM estimate of the `p`-factor loadings.
///
/// Parameters
/// ----------
/// - `p`: number of factors, `p < T`.
/// - `outcomes`: control outcomes, `T × N0`.
/// - `instruments`: control instruments, `N0 × L`.
/// - `opts`: minimizer settings and convergence policy.
///
/// Returns
/// -------
/// [`FactorFit`] with the second-step `θ̂`, its weighting matrix, and the
/// overidentification test.
///
/// Errors
/// ------
/// - Shape errors from [`FactorMoments::new`].
/// - `FactorError::Optimization` from either minimizer run, including
///   `NotConverged` under [`ConvergencePolicy::Error`].
pub fn fit_factor_model(
    p: usize, outcomes: ArrayView2<f64>, instruments: ArrayView2<f64>, opts: &GmmOptions,
) -> FactorResult<FactorFit> {
    let moments = FactorMoments::new(p, outcomes, instruments)?;
    let n_moments = moments.n_moments();

    let identity = Array2::<f64>::eye(n_moments);
    let first_step =
        minimize(&moments, Theta::zeros(moments.n_params()), &identity, &opts.minimizer)?;
    opts.convergence.enforce(&first_step, "first")?;
    log::debug!(
        "p = {p}: first GMM step value {:.6e} after {} iterations",
        first_step.value,
        first_step.iterations
    );

    let covariance = moments.covariance(&first_step.theta_hat)?;
    let inverse = pinv_symmetric(covariance.view());
    if !inverse.is_full_rank() {
        log::warn!(
            "p = {p}: moment covariance is singular (rank {} of {n_moments}); using pseudo-inverse",
            inverse.rank
        );
    }
    let weight = inverse.matrix;

    let second_step =
        minimize(&moments, first_step.theta_hat.clone(), &weight, &opts.minimizer)?;
    opts.convergence.enforce(&second_step, "second")?;

    let theta = second_step.theta_hat.clone();
    let mean = moments.mean_moments(&theta)?;
    let j_stat = (moments.n_controls() as f64 * mean.dot(&weight.dot(&mean))).max(0.0);
    let df = moments.n_instruments().saturating_sub(p);
    let p_value = j_test_pvalue(j_stat, df)?;
    log::debug!("p = {p}: J = {j_stat:.6}, df = {df}, p-value = {p_value:.4}");

    Ok(FactorFit { theta, weight, moments, j_stat, df, p_value, first_step, second_step })
}

/// Upper-tail χ²(df) probability of `j_stat`; exactly 1 when `df == 0`.
pub fn j_test_pvalue(j_stat: f64, df: usize) -> FactorResult<f64> {
    if df == 0 {
        return Ok(1.0);
    }
    let dist = ChiSquared::new(df as f64).map_err(|_| FactorError::InvalidDistribution { df })?;
    Ok((1.0 - dist.cdf(j_stat)).clamp(0.0, 1.0))
}

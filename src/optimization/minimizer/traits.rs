//! Public API surface for objective minimization.
//!
//! - [`Objective`]: trait users implement for their estimation criterion.
//! - [`MinimizerOptions`] and [`Tolerances`]: configuration for the optimizer.
//! - [`LineSearcher`]: choice of line search used by L-BFGS.
//! - [`OptimOutcome`]: normalized result returned by the high-level `minimize` API.
//!
//! Convention: the user objective `c(θ)` is handed to argmin unchanged. If an
//! analytic gradient is provided it must be `∇c(θ)`.
use crate::optimization::{
    errors::{OptError, OptResult},
    minimizer::{
        Cost, FnEvalMap, Grad, Theta,
        validation::{validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad},
    },
};
use argmin::core::{TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;
use std::str::FromStr;

/// User-implemented objective interface.
///
/// - `type Data`: per-problem data carried into `value`/`grad`/`check`.
///
/// Required:
/// - `value(&Theta, &Data) -> OptResult<Cost>`: evaluate `c(θ)`.
/// - `check(&Theta, &Data) -> OptResult<()>`: validation hook to reject
///   obviously invalid `θ`/`data` pairs. Called once before optimization.
///
/// Optional:
/// - `grad(&Theta, &Data) -> OptResult<Grad>`: analytic gradient `∇c(θ)`.
///   If not implemented, finite differences are used automatically.
pub trait Objective {
    type Data: 'static;

    // Required methods
    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    // Optional methods
    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Choice of line search used inside the L-BFGS solver.
///
/// Parsing is case-insensitive (`"MoreThuente"`, `"HagerZhang"`). Unknown
/// names return `OptError::InvalidLineSearch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Optimizer-level configuration.
///
/// Fields:
/// - `tols: Tolerances` — numerical tolerances and iteration limits.
/// - `line_searcher: LineSearcher` — line-search algorithm used by L-BFGS.
/// - `verbose: bool` — with the `obs_slog` feature, attaches argmin's
///   terminal observer to every iteration.
/// - `lbfgs_mem: Option<usize>` — history size; `None` uses
///   [`DEFAULT_LBFGS_MEM`](super::types::DEFAULT_LBFGS_MEM).
///
/// Default:
/// - `tols`: `tol_grad = 1e-10`, `tol_cost = None`, `max_iter = 500`
/// - `line_searcher`: `MoreThuente`
/// - `verbose`: `false`
/// - `lbfgs_mem`: `None`
#[derive(Debug, Clone, PartialEq)]
pub struct MinimizerOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
}

impl MinimizerOptions {
    /// Create a new set of optimizer options.
    ///
    /// Validation of numeric tolerance values happens in [`Tolerances::new`];
    /// this constructor only rejects a zero L-BFGS memory.
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, verbose: bool, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if let Some(m) = lbfgs_mem {
            if m == 0 {
                return Err(OptError::InvalidLBFGSMem {
                    mem: m,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        Ok(Self { tols, line_searcher, verbose, lbfgs_mem })
    }
}

impl Default for MinimizerOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-10), tol_cost: None, max_iter: Some(500) },
            line_searcher: LineSearcher::MoreThuente,
            verbose: false,
            lbfgs_mem: None,
        }
    }
}

/// Numerical tolerances and iteration limits used by the optimizer.
///
/// - `tol_grad`: terminate when the gradient norm falls below this threshold.
/// - `tol_cost`: terminate when the change in cost falls below this threshold.
/// - `max_iter`: hard cap on the number of iterations.
///
/// Any field can be `None` but **at least one** of the three must be provided
/// (see [`Tolerances::new`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Rules
    /// - At least one of `tol_grad`, `tol_cost`, or `max_iter` must be `Some`.
    /// - If provided, tolerances must be **finite and strictly positive**.
    /// - If provided, `max_iter` must be `> 0`.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for non-finite or non-positive tolerances.
    /// - `OptError::InvalidMaxIter` if `max_iter == 0`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Canonical result returned by `minimize`.
///
/// - `theta_hat`: best parameter vector found.
/// - `value`: best objective value `c(θ̂)`.
/// - `converged`: `true` only when the solver met one of its convergence
///   criteria (gradient/cost tolerance or target cost). Hitting the
///   iteration cap, being interrupted, or a solver-specific exit all count
///   as *not* converged.
/// - `status`: human-readable termination status string.
/// - `iterations`: number of optimizer iterations performed.
/// - `fn_evals`: function-evaluation counters reported by `argmin`.
/// - `grad_norm`: norm of the last available gradient, if present.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// Build a validated [`OptimOutcome`] from raw solver state.
    ///
    /// Performs:
    /// - `theta_hat` check via `validate_theta_hat` (present and all finite).
    /// - `value` check via `validate_value` (finite).
    /// - Maps `TerminationStatus` into `(converged, status)`.
    /// - Computes `grad_norm` if a gradient was provided.
    ///
    /// # Errors
    /// - Propagates any validation errors for `theta_hat` or `value`.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let (converged, status) = classify_termination(&termination);
        let iterations = iterations as usize;
        let grad_norm = grad.map(|g| g.l2_norm());
        Ok(Self { theta_hat, value, converged, status, iterations, fn_evals, grad_norm })
    }

    /// Outcome for a problem with no free parameters.
    ///
    /// Nothing is optimized; the objective value at the empty vector is
    /// reported and the run counts as converged.
    pub fn trivial(value: f64) -> OptResult<Self> {
        validate_value(value)?;
        Ok(Self {
            theta_hat: Theta::zeros(0),
            value,
            converged: true,
            status: "No free parameters".to_string(),
            iterations: 0,
            fn_evals: FnEvalMap::new(),
            grad_norm: None,
        })
    }
}

// ---- Helper Methods ----

fn classify_termination(termination: &TerminationStatus) -> (bool, String) {
    match termination {
        TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
        TerminationStatus::Terminated(reason) => {
            let converged = matches!(
                reason,
                TerminationReason::SolverConverged | TerminationReason::TargetCostReached
            );
            (converged, format!("{reason:?}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // - Tolerance and option validation.
    // - Mapping of argmin termination reasons onto `converged`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Tolerances without any stopping rule are rejected.
    //
    // Given
    // -----
    // - `tol_grad`, `tol_cost`, `max_iter` all `None`.
    //
    // Expect
    // ------
    // - `OptError::NoTolerancesProvided`.
    fn tolerances_require_at_least_one_rule() {
        // Act
        let result = Tolerances::new(None, None, None);

        // Assert
        assert_eq!(result, Err(OptError::NoTolerancesProvided));
    }

    #[test]
    // Purpose
    // -------
    // Zero L-BFGS memory is a configuration error.
    //
    // Given
    // -----
    // - Valid tolerances and `lbfgs_mem = Some(0)`.
    //
    // Expect
    // ------
    // - `OptError::InvalidLBFGSMem`.
    fn minimizer_options_reject_zero_memory() {
        // Arrange
        let tols = Tolerances::new(Some(1e-8), None, Some(10)).expect("valid tolerances");

        // Act
        let result = MinimizerOptions::new(tols, LineSearcher::HagerZhang, false, Some(0));

        // Assert
        assert!(matches!(result, Err(OptError::InvalidLBFGSMem { mem: 0, .. })));
    }

    #[test]
    // Purpose
    // -------
    // Only genuine convergence reasons set `converged`.
    //
    // Given
    // -----
    // - `SolverConverged`, `MaxItersReached`, and `NotTerminated` statuses.
    //
    // Expect
    // ------
    // - `true` for `SolverConverged`, `false` for the other two.
    fn outcome_treats_iteration_cap_as_not_converged() {
        // Arrange
        let theta = Some(Theta::zeros(2));
        let converged = TerminationStatus::Terminated(TerminationReason::SolverConverged);
        let capped = TerminationStatus::Terminated(TerminationReason::MaxItersReached);

        // Act
        let ok = OptimOutcome::new(theta.clone(), 0.5, converged, 3, FnEvalMap::new(), None)
            .expect("valid outcome");
        let cap = OptimOutcome::new(theta.clone(), 0.5, capped, 500, FnEvalMap::new(), None)
            .expect("valid outcome");
        let open = OptimOutcome::new(
            theta,
            0.5,
            TerminationStatus::NotTerminated,
            0,
            FnEvalMap::new(),
            None,
        )
        .expect("valid outcome");

        // Assert
        assert!(ok.converged);
        assert!(!cap.converged);
        assert!(!open.converged);
        assert_eq!(cap.status, "MaxItersReached");
    }

    #[test]
    // Purpose
    // -------
    // Line-search names parse case-insensitively and reject unknowns.
    //
    // Given
    // -----
    // - `"hagerZHANG"` and `"bisection"`.
    //
    // Expect
    // ------
    // - `HagerZhang` for the first, `InvalidLineSearch` for the second.
    fn line_searcher_parses_case_insensitively() {
        // Act / Assert
        assert_eq!("hagerZHANG".parse::<LineSearcher>(), Ok(LineSearcher::HagerZhang));
        assert!(matches!(
            "bisection".parse::<LineSearcher>(),
            Err(OptError::InvalidLineSearch { .. })
        ));
    }
}

//! High-level entry point for minimizing a user-provided `Objective`.
//!
//! Selects an L-BFGS solver with either Hager–Zhang or More–Thuente line
//! search, wraps the objective in an `ArgMinAdapter`, and delegates the run
//! to `run_lbfgs`.
use crate::optimization::{
    errors::OptResult,
    minimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::{hager_zhang_lbfgs, more_thuente_lbfgs},
        run::run_lbfgs,
        traits::{LineSearcher, MinimizerOptions, Objective},
    },
};

/// Minimize an objective `c(θ)` using L-BFGS with the chosen line search.
///
/// # Behavior
/// - Validates the initial guess via `f.check(theta0, data)`.
/// - For an empty `theta0` nothing is optimized: the objective is evaluated
///   once and returned through [`OptimOutcome::trivial`].
/// - Otherwise builds the solver selected by `opts.line_searcher` and runs
///   it through `run_lbfgs`.
///
/// # Errors
/// - Propagates any error from `f.check` or `f.value`.
/// - Propagates builder and runtime errors from the solver layer.
///
/// # Returns
/// An [`OptimOutcome`]. Callers decide what to do with
/// `outcome.converged == false`.
pub fn minimize<F: Objective>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MinimizerOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    if theta0.is_empty() {
        let value = f.value(&theta0, data)?;
        return OptimOutcome::trivial(value);
    }
    let problem = ArgMinAdapter::new(f, data);
    match opts.line_searcher {
        LineSearcher::MoreThuente => {
            let solver = more_thuente_lbfgs(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        LineSearcher::HagerZhang => {
            let solver = hager_zhang_lbfgs(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{
        errors::OptError,
        minimizer::{Cost, Grad, Tolerances},
    };
    use approx::assert_abs_diff_eq;
    use ndarray::{Array1, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // End-to-end `minimize` runs on a small convex quadratic, with and without
    // an analytic gradient, plus the zero-parameter shortcut.
    // -------------------------------------------------------------------------

    /// c(θ) = Σ w_i (θ_i − t_i)² with diagonal weights.
    struct Weighted;

    struct Target {
        weights: Array1<f64>,
        target: Array1<f64>,
    }

    impl Objective for Weighted {
        type Data = Target;

        fn value(&self, theta: &Theta, d: &Target) -> OptResult<Cost> {
            if theta.len() != d.target.len() {
                return Err(OptError::ThetaLengthMismatch {
                    expected: d.target.len(),
                    actual: theta.len(),
                });
            }
            Ok((&d.weights * &(theta - &d.target).mapv(|x| x * x)).sum())
        }

        fn check(&self, theta: &Theta, d: &Target) -> OptResult<()> {
            self.value(theta, d).map(|_| ())
        }

        fn grad(&self, theta: &Theta, d: &Target) -> OptResult<Grad> {
            Ok(2.0 * &d.weights * &(theta - &d.target))
        }
    }

    #[test]
    // Purpose
    // -------
    // Both line searches recover the minimizer of a convex quadratic.
    //
    // Given
    // -----
    // - Weights (1, 10, 0.5), target (1, −2, 3), θ₀ = 0.
    //
    // Expect
    // ------
    // - θ̂ ≈ target, converged, cost ≈ 0.
    fn minimize_recovers_quadratic_minimizer_with_both_line_searches() {
        // Arrange
        let data = Target { weights: array![1.0, 10.0, 0.5], target: array![1.0, -2.0, 3.0] };
        for ls in [LineSearcher::MoreThuente, LineSearcher::HagerZhang] {
            let tols = Tolerances::new(Some(1e-10), None, Some(200)).expect("tolerances");
            let opts = MinimizerOptions::new(tols, ls, false, None).expect("options");

            // Act
            let out = minimize(&Weighted, Array1::zeros(3), &data, &opts).expect("minimize");

            // Assert
            assert!(out.converged, "{ls:?} should converge, status {}", out.status);
            for i in 0..3 {
                assert_abs_diff_eq!(out.theta_hat[i], data.target[i], epsilon = 1e-6);
            }
            assert_abs_diff_eq!(out.value, 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    // Purpose
    // -------
    // A wrong-length starting point is rejected by `check` before any solve.
    //
    // Given
    // -----
    // - A 3-parameter problem and θ₀ of length 2.
    //
    // Expect
    // ------
    // - `OptError::ThetaLengthMismatch`.
    fn minimize_rejects_bad_initial_guess() {
        // Arrange
        let data = Target { weights: array![1.0, 1.0, 1.0], target: array![0.0, 0.0, 0.0] };

        // Act
        let err = minimize(&Weighted, Array1::zeros(2), &data, &MinimizerOptions::default())
            .expect_err("length mismatch");

        // Assert
        assert_eq!(err, OptError::ThetaLengthMismatch { expected: 3, actual: 2 });
    }

    #[test]
    // Purpose
    // -------
    // Empty parameter vectors short-circuit to a trivial, converged outcome.
    //
    // Given
    // -----
    // - A zero-parameter problem.
    //
    // Expect
    // ------
    // - `converged`, zero iterations, empty θ̂.
    fn minimize_with_no_parameters_is_trivial() {
        // Arrange
        let data = Target { weights: Array1::zeros(0), target: Array1::zeros(0) };

        // Act
        let out = minimize(&Weighted, Array1::zeros(0), &data, &MinimizerOptions::default())
            .expect("trivial");

        // Assert
        assert!(out.converged);
        assert_eq!(out.iterations, 0);
        assert!(out.theta_hat.is_empty());
    }
}

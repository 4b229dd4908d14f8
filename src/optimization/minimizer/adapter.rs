//! Adapter that exposes a user `Objective` as an `argmin` problem.
//!
//! The objective is minimized as-is. Analytic gradients are validated and
//! passed through; when none is provided the cost closure is differenced
//! numerically.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    minimizer::{
        finite_diff::run_fd_diff,
        traits::Objective,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

/// Bridges a user `Objective` to `argmin`'s `CostFunction` and `Gradient`.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: Objective> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: Objective> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate the cost `c(θ)`.
    ///
    /// # Errors
    /// Propagates any `OptError` from the user’s `value` and rejects
    /// non-finite outputs with `NonFiniteCost`.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let output = self.f.value(theta, self.data)?;
        if !output.is_finite() {
            return Err((OptError::NonFiniteCost { value: output }).into());
        }
        Ok(output)
    }
}

impl<'a, F: Objective> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Evaluate the gradient of the cost at `θ`.
    ///
    /// Behavior:
    /// - If the user implements `grad(θ, data)`, it is validated and returned.
    /// - Otherwise a *central* finite-difference gradient of the cost is
    ///   taken. If any cost evaluation failed (captured via `closure_err`) or
    ///   the result is non-finite, the gradient is retried once with
    ///   *forward* differences.
    ///
    /// The FD closure must return `f64`, so the first error raised inside it
    /// is parked in `closure_err` and `NaN` is returned instead.
    ///
    /// # Errors
    /// - Propagates user errors from `grad` (non-`GradientNotImplemented`).
    /// - Propagates any error raised by cost evaluations performed during FD.
    /// - Returns validation errors if the gradient has wrong dimension or
    ///   non-finite entries.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let dim = theta.len();
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, dim)?;
                Ok(g)
            }
            Err(OptError::GradientNotImplemented) => {
                let closure_err: RefCell<Option<Error>> = RefCell::new(None);
                let cost_func = |theta: &Theta| -> f64 {
                    match self.cost(theta) {
                        Ok(val) => val,
                        Err(e) => {
                            let mut slot = closure_err.borrow_mut();
                            if slot.is_none() {
                                *slot = Some(e);
                            }
                            f64::NAN
                        }
                    }
                };
                let fd_grad = theta.central_diff(&cost_func);
                if closure_err.borrow().is_none() && validate_grad(&fd_grad, dim).is_ok() {
                    return Ok(fd_grad);
                }
                Ok(run_fd_diff(theta, &cost_func, &closure_err)?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl<'a, F: Objective> ArgMinAdapter<'a, F> {
    /// Construct a new adapter over a user `Objective` and its data.
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptResult;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // - Pass-through of analytic gradients.
    // - Finite-difference fallback when `grad` is not implemented.
    // -------------------------------------------------------------------------

    struct Bowl;

    impl Objective for Bowl {
        type Data = f64;

        fn value(&self, theta: &Theta, shift: &f64) -> OptResult<Cost> {
            Ok(theta.mapv(|x| (x - shift).powi(2)).sum())
        }

        fn check(&self, _theta: &Theta, _shift: &f64) -> OptResult<()> {
            Ok(())
        }
    }

    struct BowlWithGrad;

    impl Objective for BowlWithGrad {
        type Data = f64;

        fn value(&self, theta: &Theta, shift: &f64) -> OptResult<Cost> {
            Bowl.value(theta, shift)
        }

        fn check(&self, _theta: &Theta, _shift: &f64) -> OptResult<()> {
            Ok(())
        }

        fn grad(&self, theta: &Theta, shift: &f64) -> OptResult<Grad> {
            Ok(theta.mapv(|x| 2.0 * (x - shift)))
        }
    }

    #[test]
    // Purpose
    // -------
    // Without an analytic gradient the adapter differences the cost.
    //
    // Given
    // -----
    // - c(θ) = Σ (θ_i − 1)² at θ = (0, 3).
    //
    // Expect
    // ------
    // - Gradient ≈ (−2, 4).
    fn gradient_falls_back_to_finite_differences() {
        // Arrange
        let shift = 1.0;
        let adapter = ArgMinAdapter::new(&Bowl, &shift);

        // Act
        let g = adapter.gradient(&array![0.0, 3.0]).expect("FD gradient");

        // Assert
        assert_abs_diff_eq!(g[0], -2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(g[1], 4.0, epsilon = 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // Analytic gradients are returned unchanged, and the cost is not negated.
    //
    // Given
    // -----
    // - `BowlWithGrad` at θ = (2,).
    //
    // Expect
    // ------
    // - cost = 1, gradient = (2,).
    fn analytic_gradient_and_cost_pass_through() {
        // Arrange
        let shift = 1.0;
        let adapter = ArgMinAdapter::new(&BowlWithGrad, &shift);
        let theta = array![2.0];

        // Act
        let c = adapter.cost(&theta).expect("cost");
        let g = adapter.gradient(&theta).expect("gradient");

        // Assert
        assert_abs_diff_eq!(c, 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(g[0], 2.0, epsilon = 1e-15);
    }
}

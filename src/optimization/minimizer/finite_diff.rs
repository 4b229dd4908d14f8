//! minimizer::finite_diff — finite-difference gradient and Jacobian helpers.
//!
//! Purpose
//! -------
//! Provide finite-difference derivative approximations around a parameter
//! vector, together with validation, so that the rest of the crate can
//! request derivatives without depending directly on the `finitediff` API.
//!
//! Key behaviors
//! -------------
//! - Compute forward-difference gradients with error capture and
//!   post-hoc validation via [`run_fd_diff`].
//! - Compute central-difference Jacobians of vector-valued, fallible
//!   functions via [`central_jacobian`], with a relative step
//!   `h_j = ∛ε · max(1, |θ_j|)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Any error raised by the user-supplied function during differencing is
//!   treated as a hard failure.
//! - Gradients and Jacobians returned from this module satisfy
//!   [`validate_grad`] / [`validate_jacobian`].
//!
//! Conventions
//! -----------
//! - Jacobians have one row per function output and one column per
//!   parameter.
//! - The central-difference step balances truncation error `O(h²)` against
//!   round-off `O(ε/h)`; with `h ≈ ∛ε` both are of order `ε^{2/3} ≈ 4e-11`
//!   relative to the scale of the function's third derivative and values.
//!   Smooth (here: rational) functions of θ are accurate to roughly 1e-9
//!   relative error.
//!
//! Downstream usage
//! ----------------
//! - The optimizer adapter calls [`run_fd_diff`] when an `Objective`
//!   implementation does not provide an analytic gradient.
//! - Variance code calls [`central_jacobian`] to differentiate the mean
//!   imputation moments with respect to the factor loadings.
//!
//! Testing notes
//! -------------
//! - Unit tests cover successful and failing paths for the gradient helper
//!   and check the Jacobian against closed-form derivatives, including the
//!   zero-parameter edge case.
use crate::optimization::{
    errors::{OptError, OptResult},
    minimizer::{
        Grad, Theta,
        types::Jacobian,
        validation::{validate_grad, validate_jacobian},
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use ndarray::Array1;
use std::cell::RefCell;

/// run_fd_diff — forward-difference gradient with error capture and validation.
///
/// Parameters
/// ----------
/// - `theta`: `&Theta`
///   Point at which the gradient is approximated.
/// - `func`: `&G`
///   Objective closure passed to `forward_diff`; expected to route any
///   evaluation error into `closure_err` and return `NaN`.
/// - `closure_err`: `&RefCell<Option<Error>>`
///   Shared error slot. Cleared on entry and inspected afterwards.
///
/// Returns
/// -------
/// `OptResult<Grad>`
///   The validated forward-difference gradient.
///
/// Errors
/// ------
/// - The error captured in `closure_err`, converted into `OptError`.
/// - `OptError::GradientDimMismatch` / `OptError::InvalidGradient` from
///   [`validate_grad`].
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    let dim = theta.len();
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, dim)?;
    Ok(fd_grad)
}

/// central_jacobian — central-difference Jacobian of a fallible vector map.
///
/// Purpose
/// -------
/// Approximate `J[k, j] = ∂f_k/∂θ_j` at `theta` by
/// `(f(θ + h_j e_j) − f(θ − h_j e_j)) / (2 h_j)` with
/// `h_j = ∛ε · max(1, |θ_j|)`.
///
/// Parameters
/// ----------
/// - `f`: `&F`
///   Vector-valued function. Its output length must not depend on `θ`.
/// - `theta`: `&Theta`
///   Expansion point. May be empty, in which case the Jacobian has zero
///   columns and `f` is evaluated once to learn the output length.
///
/// Returns
/// -------
/// `Result<Jacobian, E>`
///   An `outputs × theta.len()` matrix with finite entries.
///
/// Errors
/// ------
/// - Any error returned by `f`.
/// - `OptError::OutputLengthChanged` if two evaluations disagree in length.
/// - `OptError::InvalidJacobian` if a difference quotient is non-finite.
pub fn central_jacobian<F, E>(f: &F, theta: &Theta) -> Result<Jacobian, E>
where
    F: Fn(&Theta) -> Result<Array1<f64>, E>,
    E: From<OptError>,
{
    let base = f(theta)?;
    let outputs = base.len();
    let n = theta.len();
    let mut jac = Jacobian::zeros((outputs, n));
    let mut shifted = theta.clone();

    for j in 0..n {
        let h = f64::EPSILON.cbrt() * theta[j].abs().max(1.0);
        shifted[j] = theta[j] + h;
        let up = f(&shifted)?;
        shifted[j] = theta[j] - h;
        let down = f(&shifted)?;
        shifted[j] = theta[j];

        for found in [up.len(), down.len()] {
            if found != outputs {
                return Err(OptError::OutputLengthChanged { expected: outputs, found }.into());
            }
        }
        let column = (up - down) / (2.0 * h);
        jac.column_mut(j).assign(&column);
    }

    validate_jacobian(&jac, outputs, n)?;
    Ok(jac)
}

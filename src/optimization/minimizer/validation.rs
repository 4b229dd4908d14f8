//! Finiteness and shape checks shared by the minimizer, the GMM criterion
//! adapter, and the finite-difference helpers.
use crate::optimization::{
    errors::{OptError, OptResult},
    minimizer::{Grad, Theta, types::Jacobian},
};

/// Gradient-norm tolerance: finite and strictly positive when present.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    match tol.map(|t| (t, tolerance_problem(t))) {
        Some((tol, Some(reason))) => Err(OptError::InvalidTolGrad { tol, reason }),
        _ => Ok(()),
    }
}

/// Cost-change tolerance: finite and strictly positive when present.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    match tol.map(|t| (t, tolerance_problem(t))) {
        Some((tol, Some(reason))) => Err(OptError::InvalidTolCost { tol, reason }),
        _ => Ok(()),
    }
}

/// Gradient of the right length with finite entries.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    match first_non_finite(grad.iter()) {
        Some((index, value)) => Err(OptError::InvalidGradient {
            index,
            value,
            reason: "criterion gradient must be finite",
        }),
        None => Ok(()),
    }
}

/// Unwrap the solver's best parameter vector.
///
/// # Errors
/// `MissingThetaHat` when the solver produced none, `InvalidThetaHat` for
/// the first non-finite loading.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    let theta = theta_hat.ok_or(OptError::MissingThetaHat)?;
    if let Some((index, value)) = first_non_finite(theta.iter()) {
        return Err(OptError::InvalidThetaHat {
            index,
            value,
            reason: "estimated loadings must be finite",
        });
    }
    Ok(theta)
}

pub fn validate_value(value: f64) -> OptResult<()> {
    if value.is_finite() { Ok(()) } else { Err(OptError::NonFiniteCost { value }) }
}

/// Jacobian of shape `(rows, cols)` with finite entries.
pub fn validate_jacobian(jacobian: &Jacobian, rows: usize, cols: usize) -> OptResult<()> {
    if jacobian.dim() != (rows, cols) {
        return Err(OptError::JacobianDimMismatch {
            expected: (rows, cols),
            found: jacobian.dim(),
        });
    }
    match jacobian.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some(((row, col), &value)) => Err(OptError::InvalidJacobian { row, col, value }),
        None => Ok(()),
    }
}

// ---- Helper methods ----

fn tolerance_problem(tol: f64) -> Option<&'static str> {
    if !tol.is_finite() {
        Some("tolerance must be finite")
    } else if tol <= 0.0 {
        Some("tolerance must be positive")
    } else {
        None
    }
}

fn first_non_finite<'a>(values: impl Iterator<Item = &'a f64>) -> Option<(usize, f64)> {
    values.copied().enumerate().find(|(_, v)| !v.is_finite())
}

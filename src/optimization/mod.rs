//! optimization — minimizer stack, numerical helpers, and unified error surface.
//!
//! Purpose
//! -------
//! Provide a cohesive optimization layer for model fitting, combining an
//! Argmin-backed objective minimizer, numerically stable linear algebra, and
//! a single error/result surface. Callers implement an objective, choose
//! tolerances, and obtain fitted parameters and diagnostics without touching
//! backend solver details.
//!
//! Key behaviors
//! -------------
//! - Expose a high-level API for **minimizing** objectives `c(θ)`
//!   (`minimizer`), including solver configuration and stopping criteria.
//! - Supply shared numerical primitives (`numerical_stability`) such as
//!   eigen-truncated pseudo-inverses.
//! - Normalize configuration issues, numerical failures, and backend solver
//!   errors into a single enum (`errors::OptError`) with a common result
//!   alias (`OptResult<T>`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Optimizers operate in an unconstrained parameter space `θ` and assume
//!   finite inputs once validation has passed; invalid states are reported
//!   as `OptError`, not panics.
//!
//! Conventions
//! -----------
//! - Parameters, gradients, and Jacobians are represented using `ndarray`
//!   aliases (`Theta`, `Grad`, `Jacobian`).
//! - Public optimization entrypoints that can fail return `OptResult<T>`;
//!   callers never see raw Argmin errors.
//! - This module avoids I/O and logging; the estimator layer reports
//!   progress and diagnostics.
//!
//! Downstream usage
//! ----------------
//! - The factor model implements `Objective` for its GMM criterion and calls
//!   `minimize`.
//! - Variance code uses `central_jacobian` and `pinv_symmetric`.
//! - Front-ends may import the curated surface via
//!   `optimization::prelude::*`.
//!
//! Testing notes
//! -------------
//! - Unit tests in the submodules focus on local concerns: solver wiring,
//!   finite-difference accuracy, pseudo-inverse identities, and error
//!   conversions.

pub mod errors;
pub mod minimizer;
pub mod numerical_stability;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use qld_did::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::minimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}

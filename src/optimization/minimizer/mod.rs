//! minimizer — argmin-powered objective minimizer.
//!
//! Purpose
//! -------
//! Provide a high-level, Argmin-backed optimization layer for **minimizing**
//! smooth objectives `c(θ)` such as GMM quadratic forms. Callers implement a
//! single trait, [`Objective`], and invoke [`minimize`] to run L-BFGS with a
//! configurable line search, tolerances, and finite-difference fallbacks.
//!
//! Key behaviors
//! -------------
//! - Expose user objectives to Argmin via [`adapter::ArgMinAdapter`].
//! - Provide a single entrypoint [`minimize`] that:
//!   - validates the initial guess with [`Objective::check`],
//!   - selects an L-BFGS solver via [`builders`] based on [`LineSearcher`],
//!   - executes the solver via [`run::run_lbfgs`], and
//!   - normalizes results into an [`OptimOutcome`].
//! - Provide finite-difference helpers in [`finite_diff`] for gradients
//!   (when analytic derivatives are missing) and Jacobians of vector maps.
//!
//! Invariants & assumptions
//! ------------------------
//! - [`Objective::value`] and [`Objective::grad`] treat invalid inputs as
//!   recoverable [`OptError`](crate::optimization::errors::OptError) values,
//!   not panics.
//! - [`OptimOutcome::converged`] is `true` only for genuine convergence;
//!   reaching the iteration cap is reported, not hidden.
//!
//! Conventions
//! -----------
//! - Parameters live in an unconstrained space as [`Theta`] (`Array1<f64>`).
//! - Errors bubble up as `OptResult<T>`; this module never intentionally
//!   panics or uses `unsafe`.
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover gradient handling in [`adapter`], solver
//!   construction in [`builders`], finite differences in [`finite_diff`],
//!   configuration and outcome invariants in [`traits`], and full solves in
//!   [`api`].

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::minimize;
pub use self::finite_diff::central_jacobian;
pub use self::traits::{LineSearcher, MinimizerOptions, Objective, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Jacobian, Theta};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use qld_did::optimization::minimizer::prelude::*;
//
// to import the main optimizer surface in a single line.

pub mod prelude {
    pub use super::api::minimize;
    pub use super::traits::{LineSearcher, MinimizerOptions, Objective, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}

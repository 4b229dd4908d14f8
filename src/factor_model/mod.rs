//! factor_model — interactive fixed effects identified by quasi-long
//! differencing on never-treated units.
//!
//! Purpose
//! -------
//! Estimate the `T × p` factor matrix `F̂` (normalized so its last `p` rows
//! are `−I_p`) by two-step GMM on instrument moments, test the implied
//! overidentifying restrictions, and select `p` sequentially.
//!
//! Key behaviors
//! -------------
//! - [`FactorMatrix`]: `θ → F̂`.
//! - [`FactorMoments`]: the GMM criterion as an [`Objective`](crate::optimization::minimizer::Objective).
//! - [`fit_factor_model`]: identity-weighted step, optimal-weight step,
//!   J test.
//! - [`select_factor_count`]: smallest `p` not rejected at a threshold.
//!
//! Invariants & assumptions
//! ------------------------
//! - Only never-treated units enter the moments.
//! - `θ` has length `(T − p) · p`; `p = 0` is a valid, empty model.

pub mod errors;
pub mod factors;
pub mod gmm;
pub mod moments;
pub mod selection;

pub use self::errors::{FactorError, FactorResult};
pub use self::factors::{FactorMatrix, n_loading_params};
pub use self::gmm::{ConvergencePolicy, FactorFit, GmmOptions, fit_factor_model, j_test_pvalue};
pub use self::moments::FactorMoments;
pub use self::selection::{FactorSelection, SelectionStep, select_factor_count};

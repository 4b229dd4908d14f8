//! numerical_stability — robust linear-algebra primitives.
//!
//! Purpose
//! -------
//! Collect the small numerical kernels the estimator relies on to stay
//! well-defined on degenerate input, chiefly pseudo-inverses of symmetric
//! positive semi-definite matrices.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are finite; shape and finiteness validation happens in the
//!   panel and optimizer layers.
//! - Singular input never fails: null directions are truncated using the
//!   relative cutoff documented in [`linalg::eigen_cutoff`].
//!
//! Conventions
//! -----------
//! - Public functions take and return `ndarray` types; `nalgebra` is used
//!   internally for the symmetric eigen-decomposition only.
//! - This module never logs; callers inspect [`linalg::PseudoInverse::rank`]
//!   and decide whether a truncation deserves a warning.

pub mod linalg;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::linalg::{PseudoInverse, eigen_cutoff, pinv_symmetric};

pub mod prelude {
    pub use super::linalg::{PseudoInverse, pinv_symmetric};
}

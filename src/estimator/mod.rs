//! estimator — validated options, the estimation pipeline, and its results.
//!
//! Purpose
//! -------
//! Tie the panel, factor-model, imputation, and inference layers into a
//! single call: [`estimate`] on a [`PanelData`](crate::panel::PanelData), or
//! [`estimate_frame`] on named columns.
//!
//! Key behaviors
//! -------------
//! - [`QldOptions`] collects every knob; [`FactorCount`], [`EffectType`],
//!   [`VarianceType`], [`BootstrapOptions`], and [`ConvergencePolicy`] are
//!   its parts.
//! - Options are checked against the panel before any optimization.
//! - [`QldEstimate`] is tagged by effect type ([`Effects`]) and variance
//!   type ([`Inference`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - No state survives a call. Bootstrap randomness is fixed by the seed in
//!   [`BootstrapOptions`].

pub mod errors;
pub mod estimate;
pub mod options;
pub mod results;
pub mod validation;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::errors::{EstimateResult, QldError};
pub use self::estimate::{estimate, estimate_frame};
pub use self::options::{BootstrapOptions, EffectType, FactorCount, QldOptions, VarianceType};
pub use self::results::{CounterfactualRow, Effects, FactorDiagnostics, Inference, QldEstimate};
pub use crate::factor_model::{ConvergencePolicy, GmmOptions};

pub mod prelude {
    pub use super::errors::{EstimateResult, QldError};
    pub use super::estimate::{estimate, estimate_frame};
    pub use super::options::{BootstrapOptions, EffectType, FactorCount, QldOptions, VarianceType};
    pub use super::results::{Effects, Inference, QldEstimate};
}

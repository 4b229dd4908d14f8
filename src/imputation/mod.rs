//! imputation — counterfactual untreated outcomes and group-time effects.
//!
//! Each treated unit's untreated path is imputed from its own pre-adoption
//! outcomes through the fitted factor matrix ([`GroupProjection`]). Gaps
//! between realized and imputed outcomes are averaged into group-time cells
//! ([`estimate_tau_gt`]); their per-unit contributions ([`ms_tau_gt`]) feed
//! the variance calculation.

pub mod projection;
pub mod tau_gt;

pub use self::projection::GroupProjection;
pub use self::tau_gt::{estimate_tau_gt, impute_y0, ms_tau_gt};

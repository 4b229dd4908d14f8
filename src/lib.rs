//! qld_did — quasi-long-differencing factor imputation for staggered
//! difference-in-differences.
//!
//! Purpose
//! -------
//! Estimate average treatment effects in balanced panels where units adopt
//! treatment at different times. Untreated outcomes follow a low-rank
//! interactive fixed-effects model whose factors are identified on
//! never-treated units by two-step GMM on instrument moments. Each treated
//! unit's counterfactual path is imputed from its own pre-adoption outcomes,
//! and the realized-minus-imputed gaps are averaged into group-time,
//! event-study, or overall effects.
//!
//! Key behaviors
//! -------------
//! - [`panel`]: column loading, validation, cell layout, within transform.
//! - [`factor_model`]: `θ → F̂`, GMM moments, J test, factor selection.
//! - [`imputation`]: counterfactual projection and group-time effects.
//! - [`inference`]: two-stage influence functions, aggregation, and the
//!   multiplier bootstrap.
//! - [`estimator`]: options, the [`estimate`](estimator::estimate) pipeline,
//!   and tagged results.
//! - [`optimization`]: the L-BFGS minimizer stack and pseudo-inverses.
//!
//! Conventions
//! -----------
//! - Wide outcome matrices are `periods × units`; instruments are
//!   `units × L`.
//! - Never-treated status is the [`Cohort::NeverTreated`](panel::Cohort)
//!   variant. The `+∞` group code is only read at the column boundary.
//! - The library logs through the `log` facade and never installs a logger.
//!
//! Testing notes
//! -------------
//! - Unit tests live beside each module; `tests/integration_qld_pipeline.rs`
//!   runs the full pipeline on seeded synthetic factor panels.

pub mod estimator;
pub mod factor_model;
pub mod imputation;
pub mod inference;
pub mod optimization;
pub mod panel;

pub use crate::estimator::{QldEstimate, QldError, QldOptions, estimate, estimate_frame};

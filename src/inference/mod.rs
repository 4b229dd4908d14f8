//! inference — variance of the cell effects and their aggregates.
//!
//! Purpose
//! -------
//! Turn per-unit moment contributions into an influence-function matrix,
//! aggregate it alongside the point estimates, and produce either an
//! analytic covariance (`IFᵀ IF`) or bootstrap uniform bands.
//!
//! Key behaviors
//! -------------
//! - [`influence_function`]: direct imputation part plus, optionally, the
//!   propagated GMM part built from [`cross_stage_jacobian`] and
//!   [`loading_influence`].
//! - [`event_study_matrix`], [`overall_matrix`], [`group_time_matrix`] and
//!   [`aggregate`]: count-weighted aggregation.
//! - [`multiplier_bootstrap`]: Rademacher multiplier bootstrap with a
//!   sup-t critical value.
//!
//! Invariants & assumptions
//! ------------------------
//! - Influence functions are `N × K` on the sum scale: rows are panel
//!   units and `Σ_i IF_i IF_iᵀ` estimates the covariance.
//! - Bootstrap randomness comes only from the caller's seed.
//!
//! Testing notes
//! -------------
//! - Each submodule tests its algebra on small hand-checked inputs; the
//!   bootstrap is additionally checked against analytic standard errors.

pub mod aggregation;
pub mod bootstrap;
pub mod errors;
pub mod influence;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::aggregation::{aggregate, event_study_matrix, group_time_matrix, overall_matrix};
pub use self::bootstrap::{UniformBand, multiplier_bootstrap, quantile_sorted};
pub use self::errors::{InferenceError, InferenceResult};
pub use self::influence::{cross_stage_jacobian, influence_function, loading_influence};

pub mod prelude {
    pub use super::bootstrap::{UniformBand, multiplier_bootstrap};
    pub use super::errors::{InferenceError, InferenceResult};
    pub use super::influence::influence_function;
}

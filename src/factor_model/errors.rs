//! Errors for the factor model and the imputation built on it.
//!
//! Optimizer failures (including non-convergence under the strict policy)
//! arrive wrapped as [`FactorError::Optimization`].
use crate::optimization::errors::OptError;

/// Result alias for factor-model and imputation routines.
pub type FactorResult<T> = Result<T, FactorError>;

#[derive(Debug, Clone, PartialEq)]
pub enum FactorError {
    // ---- Shapes ----
    /// The factor count leaves no periods to model.
    InvalidFactorCount { p: usize, n_periods: usize, reason: &'static str },

    /// Parameter vector length does not equal `(T − p) · p`.
    ThetaLengthMismatch { expected: usize, found: usize },

    /// Instrument and outcome matrices disagree on the number of units.
    UnitCountMismatch { outcomes: usize, instruments: usize },

    /// No never-treated units were supplied to the moment conditions.
    NoControls,

    /// Outcome matrix shape disagrees with the cell layout.
    LayoutMismatch { expected: (usize, usize), found: (usize, usize) },

    /// Effect vector length disagrees with the number of cells.
    CellCountMismatch { expected: usize, found: usize },

    // ---- Inference ----
    /// The chi-square reference distribution could not be built.
    InvalidDistribution { df: usize },

    // ---- Optimizer ----
    Optimization(OptError),
}

impl From<OptError> for FactorError {
    fn from(err: OptError) -> Self {
        FactorError::Optimization(err)
    }
}

impl std::error::Error for FactorError {}

impl std::fmt::Display for FactorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Shapes ----
            FactorError::InvalidFactorCount { p, n_periods, reason } => {
                write!(f, "Factor Error: invalid factor count {p} for {n_periods} periods: {reason}")
            }
            FactorError::ThetaLengthMismatch { expected, found } => {
                write!(f, "Factor Error: theta has length {found}, expected {expected}")
            }
            FactorError::UnitCountMismatch { outcomes, instruments } => write!(
                f,
                "Factor Error: {outcomes} outcome columns but {instruments} instrument rows"
            ),
            FactorError::NoControls => write!(f, "Factor Error: no control units supplied"),
            FactorError::LayoutMismatch { expected, found } => write!(
                f,
                "Factor Error: outcome matrix is {found:?}, cell layout expects {expected:?}"
            ),
            FactorError::CellCountMismatch { expected, found } => {
                write!(f, "Factor Error: {found} cell effects supplied, layout has {expected}")
            }

            // ---- Inference ----
            FactorError::InvalidDistribution { df } => {
                write!(f, "Factor Error: cannot build chi-square distribution with {df} df")
            }

            // ---- Optimizer ----
            FactorError::Optimization(err) => write!(f, "Factor Error: {err}"),
        }
    }
}

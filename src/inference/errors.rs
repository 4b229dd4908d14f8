//! Unified error handling for inference routines.
//!
//! `InferenceError` covers the variance stage of the pipeline: influence
//! function assembly, aggregation, and the multiplier bootstrap. Failures
//! raised by the imputation or optimizer layers while differencing are
//! carried through unchanged. An alias `InferenceResult<T>` standardizes the
//! return type across inference code.
use crate::factor_model::FactorError;
use crate::optimization::errors::OptError;

/// Unified error type for inference routines.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    // ---- Bootstrap settings ----
    /// Number of bootstrap draws is not usable.
    InvalidDraws { draws: usize, reason: &'static str },

    /// Confidence level outside the open unit interval.
    InvalidConfidence { level: f64, reason: &'static str },

    // ---- Inputs ----
    /// Two matrices that must conform do not.
    DimensionMismatch { what: &'static str, expected: usize, found: usize },

    /// The influence function has no observations.
    EmptyInfluence,

    /// An influence-function entry is NaN or infinite.
    NonFiniteInfluence { row: usize, col: usize, value: f64 },

    // ---- Aggregation ----
    /// The overall effect needs at least one post-treatment cell.
    NoPostTreatmentCells,

    // ---- Distributions ----
    Distribution { reason: String },

    // ---- Upstream ----
    Factor(FactorError),
    Optimization(OptError),
}

pub type InferenceResult<T> = Result<T, InferenceError>;

impl From<FactorError> for InferenceError {
    fn from(err: FactorError) -> Self {
        InferenceError::Factor(err)
    }
}

impl From<OptError> for InferenceError {
    fn from(err: OptError) -> Self {
        InferenceError::Optimization(err)
    }
}

impl std::error::Error for InferenceError {}

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Bootstrap settings ----
            InferenceError::InvalidDraws { draws, reason } => {
                write!(f, "Inference Error: invalid draw count {draws}: {reason}")
            }
            InferenceError::InvalidConfidence { level, reason } => {
                write!(f, "Inference Error: invalid confidence level {level}: {reason}")
            }

            // ---- Inputs ----
            InferenceError::DimensionMismatch { what, expected, found } => {
                write!(f, "Inference Error: {what} has dimension {found}, expected {expected}")
            }
            InferenceError::EmptyInfluence => {
                write!(f, "Inference Error: influence function has no observations")
            }
            InferenceError::NonFiniteInfluence { row, col, value } => write!(
                f,
                "Inference Error: non-finite influence value {value} at ({row}, {col})"
            ),

            // ---- Aggregation ----
            InferenceError::NoPostTreatmentCells => {
                write!(f, "Inference Error: no post-treatment cells to aggregate")
            }

            // ---- Distributions ----
            InferenceError::Distribution { reason } => {
                write!(f, "Inference Error: distribution error: {reason}")
            }

            // ---- Upstream ----
            InferenceError::Factor(err) => write!(f, "Inference Error: {err}"),
            InferenceError::Optimization(err) => write!(f, "Inference Error: {err}"),
        }
    }
}

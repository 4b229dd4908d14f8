//! Unified error handling for the estimation entry points.
//!
//! `QldError` reports option validation failures raised before any
//! estimation work and wraps the errors of every layer below, so `?` works
//! from panel loading through the bootstrap.
use crate::factor_model::FactorError;
use crate::inference::InferenceError;
use crate::optimization::errors::OptError;
use crate::panel::PanelError;

pub type EstimateResult<T> = Result<T, QldError>;

#[derive(Debug, Clone, PartialEq)]
pub enum QldError {
    // ---- Factor count ----
    /// Factor-count code outside `[−1, T0 − 1]`.
    InvalidFactorCount { value: i64, max: i64, reason: &'static str },

    /// More factors than instruments.
    FactorCountExceedsInstruments { p: usize, instruments: usize },

    /// The earliest cohort has no more pre-treatment periods than factors.
    AdoptionTooEarly { adoption: i64, shift: usize, p: usize },

    /// Selection requested without a p-value threshold.
    MissingThreshold,

    /// Selection threshold outside `(0, 1)`.
    InvalidThreshold { value: f64, reason: &'static str },

    // ---- Names ----
    InvalidEffectType { name: String },
    InvalidVarianceType { name: String },

    // ---- Upstream ----
    Panel(PanelError),
    Factor(FactorError),
    Optimization(OptError),
    Inference(InferenceError),
}

impl From<PanelError> for QldError {
    fn from(err: PanelError) -> Self {
        QldError::Panel(err)
    }
}

impl From<FactorError> for QldError {
    fn from(err: FactorError) -> Self {
        QldError::Factor(err)
    }
}

impl From<OptError> for QldError {
    fn from(err: OptError) -> Self {
        QldError::Optimization(err)
    }
}

impl From<InferenceError> for QldError {
    fn from(err: InferenceError) -> Self {
        QldError::Inference(err)
    }
}

impl std::error::Error for QldError {}

impl std::fmt::Display for QldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Factor count ----
            QldError::InvalidFactorCount { value, max, reason } => {
                write!(f, "Estimation Error: factor count {value} outside [-1, {max}]: {reason}")
            }
            QldError::FactorCountExceedsInstruments { p, instruments } => write!(
                f,
                "Estimation Error: {p} factors requested but only {instruments} instruments"
            ),
            QldError::AdoptionTooEarly { adoption, shift, p } => write!(
                f,
                "Estimation Error: cohort adopting at {adoption} has {shift} pre-treatment periods, \
                 need more than {p}"
            ),
            QldError::MissingThreshold => {
                write!(f, "Estimation Error: factor selection requires a p-value threshold")
            }
            QldError::InvalidThreshold { value, reason } => {
                write!(f, "Estimation Error: invalid p-value threshold {value}: {reason}")
            }

            // ---- Names ----
            QldError::InvalidEffectType { name } => write!(
                f,
                "Estimation Error: unknown effect type '{name}' \
                 (expected group-time, event-study, or overall)"
            ),
            QldError::InvalidVarianceType { name } => write!(
                f,
                "Estimation Error: unknown variance type '{name}' \
                 (expected pointwise, uniform, or naive)"
            ),

            // ---- Upstream ----
            QldError::Panel(err) => write!(f, "Estimation Error: {err}"),
            QldError::Factor(err) => write!(f, "Estimation Error: {err}"),
            QldError::Optimization(err) => write!(f, "Estimation Error: {err}"),
            QldError::Inference(err) => write!(f, "Estimation Error: {err}"),
        }
    }
}

//! Error surface of the optimization layer.
//!
//! Every failure raised while configuring the minimizer, evaluating a GMM
//! criterion, differencing a moment map, or running argmin ends up as an
//! [`OptError`]. Argmin's boxed `Error` is unwrapped at the boundary: an
//! `OptError` that travelled through argmin comes back unchanged, argmin's
//! own error kinds become [`OptError::Backend`] tagged with a
//! [`BackendKind`].
use argmin::core::{ArgminError, Error};

/// Result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

/// Classification of errors raised inside argmin itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    InvalidParameter,
    NotImplemented,
    NotInitialized,
    ConditionViolated,
    CheckpointNotFound,
    PotentialBug,
    ImpossibleError,
    Other,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::InvalidParameter => "invalid parameter",
            BackendKind::NotImplemented => "not implemented",
            BackendKind::NotInitialized => "not initialized",
            BackendKind::ConditionViolated => "condition violated",
            BackendKind::CheckpointNotFound => "checkpoint not found",
            BackendKind::PotentialBug => "potential bug",
            BackendKind::ImpossibleError => "impossible error",
            BackendKind::Other => "backend error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient ----
    /// Objective has no analytic gradient; finite differences take over.
    GradientNotImplemented,
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    // ---- MinimizerOptions ----
    InvalidTolGrad {
        tol: f64,
        reason: &'static str,
    },
    InvalidTolCost {
        tol: f64,
        reason: &'static str,
    },
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },
    /// Neither a tolerance nor an iteration cap was given.
    NoTolerancesProvided,
    InvalidLineSearch {
        name: String,
        reason: &'static str,
    },
    InvalidLBFGSMem {
        mem: usize,
        reason: &'static str,
    },

    // ---- GMM criterion ----
    NonFiniteCost {
        value: f64,
    },
    ThetaLengthMismatch {
        expected: usize,
        actual: usize,
    },
    /// Weighting matrix is not `K × K` for `K` stacked moments.
    WeightShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    // ---- Optimizer outcome ----
    InvalidThetaHat {
        index: usize,
        value: f64,
        reason: &'static str,
    },
    MissingThetaHat,
    /// Solver stopped without meeting a convergence criterion.
    NotConverged {
        status: String,
        iterations: usize,
    },

    // ---- Finite differences ----
    JacobianDimMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    InvalidJacobian {
        row: usize,
        col: usize,
        value: f64,
    },
    /// Moment map changed output length between perturbed evaluations.
    OutputLengthChanged {
        expected: usize,
        found: usize,
    },

    // ---- Argmin ----
    Backend {
        kind: BackendKind,
        text: String,
    },
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptError::GradientNotImplemented => write!(f, "Analytic gradient not implemented"),
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient has length {found}, expected {expected}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Gradient entry {index} is {value}: {reason}")
            }
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Gradient tolerance {tol} rejected: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "Cost-change tolerance {tol} rejected: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Iteration cap {max_iter} rejected: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "At least one stopping rule must be configured")
            }
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "Unknown line search '{name}': {reason}")
            }
            OptError::InvalidLBFGSMem { mem, reason } => {
                write!(f, "L-BFGS memory {mem} rejected: {reason}")
            }
            OptError::NonFiniteCost { value } => write!(f, "GMM criterion evaluated to {value}"),
            OptError::ThetaLengthMismatch { expected, actual } => {
                write!(f, "Loading vector has length {actual}, expected {expected}")
            }
            OptError::WeightShapeMismatch { expected, found } => {
                write!(f, "Weighting matrix is {found:?}, expected {expected:?}")
            }
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Estimated loading {index} is {value}: {reason}")
            }
            OptError::MissingThetaHat => write!(f, "Solver returned no parameter estimate"),
            OptError::NotConverged { status, iterations } => {
                write!(f, "Solver did not converge after {iterations} iterations: {status}")
            }
            OptError::JacobianDimMismatch { expected, found } => {
                write!(f, "Jacobian is {found:?}, expected {expected:?}")
            }
            OptError::InvalidJacobian { row, col, value } => {
                write!(f, "Jacobian entry ({row}, {col}) is {value}")
            }
            OptError::OutputLengthChanged { expected, found } => {
                write!(f, "Moment map returned {found} outputs, expected {expected}")
            }
            OptError::Backend { kind, text } => write!(f, "argmin {}: {text}", kind.as_str()),
        }
    }
}

impl From<Error> for OptError {
    fn from(err: Error) -> Self {
        let err = match err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match err.downcast::<ArgminError>() {
            Ok(argmin_err) => {
                let (kind, text) = match argmin_err {
                    ArgminError::InvalidParameter { text } => (BackendKind::InvalidParameter, text),
                    ArgminError::NotImplemented { text } => (BackendKind::NotImplemented, text),
                    ArgminError::NotInitialized { text } => (BackendKind::NotInitialized, text),
                    ArgminError::ConditionViolated { text } => (BackendKind::ConditionViolated, text),
                    ArgminError::CheckpointNotFound { text } => {
                        (BackendKind::CheckpointNotFound, text)
                    }
                    ArgminError::PotentialBug { text } => (BackendKind::PotentialBug, text),
                    ArgminError::ImpossibleError { text } => (BackendKind::ImpossibleError, text),
                    other => (BackendKind::Other, other.to_string()),
                };
                OptError::Backend { kind, text }
            }
            Err(err) => OptError::Backend { kind: BackendKind::Other, text: err.to_string() },
        }
    }
}

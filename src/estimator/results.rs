//! Estimation results as tagged types.
//!
//! The reported fields depend on the requested effect and variance types.
//! [`Effects`] carries the point estimates together with the labels that
//! belong to its aggregation, and [`Inference`] carries either a covariance
//! matrix or bootstrap standard errors with a uniform critical value.
use crate::estimator::options::VarianceType;
use crate::factor_model::SelectionStep;
use crate::optimization::minimizer::Theta;
use crate::panel::Cohort;
use ndarray::{Array1, Array2};
use statrs::distribution::{ContinuousCDF, Normal};

/// Point estimates and their labels.
#[derive(Debug, Clone, PartialEq)]
pub enum Effects {
    GroupTime {
        estimates: Array1<f64>,
        /// `(adoption period, calendar period)` per estimate.
        cells: Vec<(i64, i64)>,
        /// Units contributing to each cell.
        counts: Vec<usize>,
    },
    EventStudy {
        estimates: Array1<f64>,
        /// Relative time `period − adoption` per estimate, ascending.
        relative_times: Vec<i64>,
    },
    Overall {
        estimate: f64,
    },
}

impl Effects {
    /// Estimates as a vector (length one for the overall effect).
    pub fn estimates(&self) -> Array1<f64> {
        match self {
            Effects::GroupTime { estimates, .. } | Effects::EventStudy { estimates, .. } => {
                estimates.clone()
            }
            Effects::Overall { estimate } => Array1::from_elem(1, *estimate),
        }
    }
}

/// Uncertainty of the reported estimates.
#[derive(Debug, Clone, PartialEq)]
pub enum Inference {
    /// Pointwise or naive analytic covariance, `K × K`.
    Covariance(Array2<f64>),
    /// Bootstrap standard errors and sup-t critical value.
    Uniform { std_errors: Array1<f64>, critical_value: f64 },
}

impl Inference {
    pub fn std_errors(&self) -> Array1<f64> {
        match self {
            Inference::Covariance(cov) => cov.diag().mapv(|v| v.max(0.0).sqrt()),
            Inference::Uniform { std_errors, .. } => std_errors.clone(),
        }
    }
}

/// Realized and imputed untreated outcome for one unit-period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterfactualRow {
    pub unit: i64,
    pub time: i64,
    pub cohort: Cohort,
    /// Outcome as estimated on (after the within transform, if applied).
    pub outcome: f64,
    pub imputed: f64,
}

/// Factor-model fit behind the estimates.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorDiagnostics {
    /// Second-step loadings.
    pub theta: Theta,
    pub j_stat: f64,
    pub df: usize,
    pub p_value: f64,
    /// Candidates evaluated; a single entry for a fixed count.
    pub selection: Vec<SelectionStep>,
    /// `false` when the search passed no candidate and kept the largest;
    /// always `true` for a fixed count.
    pub selection_accepted: bool,
}

/// QldEstimate — result of one estimation call.
#[derive(Debug, Clone, PartialEq)]
pub struct QldEstimate {
    pub factor_count: usize,
    pub variance: VarianceType,
    pub effects: Effects,
    pub inference: Inference,
    pub counterfactual: Option<Vec<CounterfactualRow>>,
    pub diagnostics: FactorDiagnostics,
}

impl QldEstimate {
    pub fn estimates(&self) -> Array1<f64> {
        self.effects.estimates()
    }

    pub fn std_errors(&self) -> Array1<f64> {
        self.inference.std_errors()
    }

    /// `(lower, upper)` bands: `±z · se` pointwise at `level`, or `±c · se`
    /// with the bootstrap critical value (where `level` is ignored).
    pub fn confidence_bands(&self, level: f64) -> Option<(Array1<f64>, Array1<f64>)> {
        let critical = match &self.inference {
            Inference::Uniform { critical_value, .. } => *critical_value,
            Inference::Covariance(_) => {
                if !(level > 0.0 && level < 1.0) {
                    return None;
                }
                Normal::new(0.0, 1.0).ok()?.inverse_cdf((1.0 + level) / 2.0)
            }
        };
        let est = self.estimates();
        let half = self.std_errors() * critical;
        Some((&est - &half, &est + &half))
    }
}

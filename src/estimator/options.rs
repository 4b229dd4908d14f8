//! Estimation options — every knob of a single estimation call.
//!
//! Purpose
//! -------
//! Collect the configuration of [`estimate`](crate::estimator::estimate) in
//! one validated value: the optional within transformation, the factor count
//! (fixed or selected), the reported effect and variance types, the
//! counterfactual table switch, bootstrap settings, and the GMM optimizer.
//!
//! Conventions
//! -----------
//! - Effect and variance names parse case-insensitively from the strings
//!   `"group-time"`, `"event-study"`, `"overall"` and `"pointwise"`,
//!   `"uniform"`, `"naive"`.
//! - Factor selection has no default threshold. Values of 0.05 and 0.10
//!   have both been used in practice; the caller chooses.
//! - Cross-field checks against the panel (factor count versus periods,
//!   instruments, and adoption timing) happen at estimation time.
use crate::estimator::errors::{EstimateResult, QldError};
use crate::factor_model::GmmOptions;
use crate::inference::InferenceError;
use std::str::FromStr;

/// Number of factors: fixed, or the smallest not rejected by the J test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FactorCount {
    Fixed(usize),
    Select { pvalue_threshold: f64 },
}

impl FactorCount {
    /// Selection at `pvalue_threshold ∈ (0, 1)`.
    ///
    /// # Errors
    /// `QldError::InvalidThreshold` outside the open unit interval.
    pub fn select(pvalue_threshold: f64) -> EstimateResult<Self> {
        validate_threshold(pvalue_threshold)?;
        Ok(FactorCount::Select { pvalue_threshold })
    }

    /// Integer code: `p ≥ 0` fixes the count, `−1` selects it.
    ///
    /// # Errors
    /// - `QldError::InvalidFactorCount` for codes below −1.
    /// - `QldError::MissingThreshold` for −1 without a threshold.
    /// - `QldError::InvalidThreshold` for a threshold outside `(0, 1)`.
    pub fn from_code(code: i64, pvalue_threshold: Option<f64>) -> EstimateResult<Self> {
        match code {
            -1 => FactorCount::select(pvalue_threshold.ok_or(QldError::MissingThreshold)?),
            c if c >= 0 => Ok(FactorCount::Fixed(c as usize)),
            c => Err(QldError::InvalidFactorCount {
                value: c,
                max: i64::MAX,
                reason: "only -1 (select) and non-negative counts are allowed",
            }),
        }
    }
}

pub(crate) fn validate_threshold(value: f64) -> EstimateResult<()> {
    if !(value > 0.0 && value < 1.0) {
        return Err(QldError::InvalidThreshold {
            value,
            reason: "threshold must lie strictly between 0 and 1",
        });
    }
    Ok(())
}

/// Reported aggregation of the group-time effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EffectType {
    GroupTime,
    #[default]
    EventStudy,
    Overall,
}

impl EffectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectType::GroupTime => "group-time",
            EffectType::EventStudy => "event-study",
            EffectType::Overall => "overall",
        }
    }
}

impl FromStr for EffectType {
    type Err = QldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "group-time" => Ok(EffectType::GroupTime),
            "event-study" => Ok(EffectType::EventStudy),
            "overall" => Ok(EffectType::Overall),
            _ => Err(QldError::InvalidEffectType { name: s.to_string() }),
        }
    }
}

impl std::fmt::Display for EffectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variance estimator for the reported effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VarianceType {
    /// Two-stage analytic covariance.
    #[default]
    Pointwise,
    /// Bootstrap standard errors and a sup-t critical value.
    Uniform,
    /// Analytic covariance ignoring loading estimation.
    Naive,
}

impl VarianceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarianceType::Pointwise => "pointwise",
            VarianceType::Uniform => "uniform",
            VarianceType::Naive => "naive",
        }
    }
}

impl FromStr for VarianceType {
    type Err = QldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pointwise" => Ok(VarianceType::Pointwise),
            "uniform" => Ok(VarianceType::Uniform),
            "naive" => Ok(VarianceType::Naive),
            _ => Err(QldError::InvalidVarianceType { name: s.to_string() }),
        }
    }
}

impl std::fmt::Display for VarianceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Multiplier bootstrap settings, used when the variance type is uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BootstrapOptions {
    pub draws: usize,
    pub confidence: f64,
    pub seed: u64,
}

impl BootstrapOptions {
    /// # Errors
    /// `InferenceError::InvalidDraws` for zero draws and
    /// `InferenceError::InvalidConfidence` outside `(0, 1)`.
    pub fn new(draws: usize, confidence: f64, seed: u64) -> EstimateResult<Self> {
        let opts = Self { draws, confidence, seed };
        opts.validate()?;
        Ok(opts)
    }

    pub(crate) fn validate(&self) -> EstimateResult<()> {
        if self.draws == 0 {
            return Err(InferenceError::InvalidDraws {
                draws: self.draws,
                reason: "at least one draw is required",
            }
            .into());
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(InferenceError::InvalidConfidence {
                level: self.confidence,
                reason: "must lie strictly between 0 and 1",
            }
            .into());
        }
        Ok(())
    }
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self { draws: 1000, confidence: 0.95, seed: 0 }
    }
}

/// QldOptions — configuration of one estimation call.
///
/// Fields
/// ------
/// - `within_transform`: demean by period and pre-period unit levels first.
/// - `factor_count`: fixed `p` or threshold-based selection.
/// - `effect`: reported aggregation (default event study).
/// - `variance`: pointwise, uniform, or naive (default pointwise).
/// - `return_counterfactual`: attach the imputed-outcome table.
/// - `bootstrap`: draws, confidence level, and seed for uniform inference.
/// - `gmm`: optimizer settings and non-convergence policy.
#[derive(Debug, Clone, PartialEq)]
pub struct QldOptions {
    pub within_transform: bool,
    pub factor_count: FactorCount,
    pub effect: EffectType,
    pub variance: VarianceType,
    pub return_counterfactual: bool,
    pub bootstrap: BootstrapOptions,
    pub gmm: GmmOptions,
}

impl QldOptions {
    /// Defaults for everything except the factor count.
    pub fn new(factor_count: FactorCount) -> Self {
        Self {
            within_transform: false,
            factor_count,
            effect: EffectType::default(),
            variance: VarianceType::default(),
            return_counterfactual: false,
            bootstrap: BootstrapOptions::default(),
            gmm: GmmOptions::default(),
        }
    }

    pub fn with_within_transform(mut self, apply: bool) -> Self {
        self.within_transform = apply;
        self
    }

    pub fn with_effect(mut self, effect: EffectType) -> Self {
        self.effect = effect;
        self
    }

    pub fn with_variance(mut self, variance: VarianceType) -> Self {
        self.variance = variance;
        self
    }

    pub fn with_counterfactual(mut self, enabled: bool) -> Self {
        self.return_counterfactual = enabled;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: BootstrapOptions) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn with_gmm(mut self, gmm: GmmOptions) -> Self {
        self.gmm = gmm;
        self
    }
}

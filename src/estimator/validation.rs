//! Fail-fast checks of the options against the panel.
//!
//! Everything here runs before the first optimizer call. Panel-level
//! structure (balance, control group, finite values) is already guaranteed
//! by [`PanelData`](crate::panel::PanelData).
use crate::estimator::{
    errors::{EstimateResult, QldError},
    options::{FactorCount, QldOptions, VarianceType, validate_threshold},
};
use crate::panel::PanelMeta;

/// Resolved factor-count request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FactorSearch {
    Fixed(usize),
    /// Candidates `0..=max_p`.
    Select { max_p: usize, pvalue_threshold: f64 },
}

/// Validate `options` for the panel described by `meta`.
///
/// # Errors
/// - `InvalidFactorCount` when a fixed `p` exceeds `T0 − 1`.
/// - `FactorCountExceedsInstruments` when a fixed `p` exceeds `L`.
/// - `InvalidThreshold` for a selection threshold outside `(0, 1)`.
/// - Bootstrap setting errors when uniform inference is requested.
pub fn validate_options(options: &QldOptions, meta: &PanelMeta) -> EstimateResult<FactorSearch> {
    let max_code = meta.pre_periods as i64 - 1;
    let search = match options.factor_count {
        FactorCount::Fixed(p) => {
            if p as i64 > max_code {
                return Err(QldError::InvalidFactorCount {
                    value: p as i64,
                    max: max_code,
                    reason: "factor count must be below the number of pre-treatment periods",
                });
            }
            if p > meta.n_instruments {
                return Err(QldError::FactorCountExceedsInstruments {
                    p,
                    instruments: meta.n_instruments,
                });
            }
            FactorSearch::Fixed(p)
        }
        FactorCount::Select { pvalue_threshold } => {
            validate_threshold(pvalue_threshold)?;
            let max_p = (meta.pre_periods.saturating_sub(1)).min(meta.n_instruments);
            FactorSearch::Select { max_p, pvalue_threshold }
        }
    };
    if options.variance == VarianceType::Uniform {
        options.bootstrap.validate()?;
    }
    Ok(search)
}

/// Every cohort must have more pre-treatment periods than factors.
///
/// # Errors
/// `QldError::AdoptionTooEarly` naming the earliest offending cohort.
pub fn ensure_adoption_after_factors(p: usize, meta: &PanelMeta) -> EstimateResult<()> {
    match meta.cells.groups().iter().find(|g| g.shift <= p) {
        Some(g) => Err(QldError::AdoptionTooEarly { adoption: g.adoption, shift: g.shift, p }),
        None => Ok(()),
    }
}

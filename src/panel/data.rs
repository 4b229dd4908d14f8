//! Balanced panel container for staggered-adoption designs.
//!
//! Purpose
//! -------
//! Turn long-format observations (one row per unit and period) into the wide
//! matrices the estimator works with, enforcing every structural invariant
//! up front so downstream code can index freely.
//!
//! Key behaviors
//! -------------
//! - [`Cohort`] replaces a floating-point "never treated" sentinel with an
//!   explicit variant.
//! - [`PanelData::from_long`] validates the input and reshapes outcomes into
//!   a `periods × units` matrix and instruments into a `units × L` matrix.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every unit is observed in every period exactly once (balanced panel).
//! - Each unit belongs to exactly one cohort.
//! - Every treated cohort has at least one pre-treatment period.
//! - At least one never-treated and one treated unit are present.
//! - Outcomes and instruments are finite.
//!
//! Conventions
//! -----------
//! - Units and periods are stored sorted ascending; matrix row `t` is
//!   `periods[t]` and column `i` is `units[i]`.
//! - Instruments are time-invariant and read from each unit's first period.
//!
//! Testing notes
//! -------------
//! - Unit tests cover reshaping, instrument extraction, and each rejection
//!   path (unbalanced, duplicate, cohort switch, missing control group).
use crate::panel::errors::{PanelError, PanelResult};
use ndarray::{Array2, ArrayView2};

/// Treatment-adoption cohort of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cohort {
    /// First period in which the unit is treated.
    Treated(i64),
    /// Never treated within the sample.
    NeverTreated,
}

impl Cohort {
    /// Adoption period, or `None` for never-treated units.
    pub fn adoption(&self) -> Option<i64> {
        match self {
            Cohort::Treated(period) => Some(*period),
            Cohort::NeverTreated => None,
        }
    }

    pub fn is_never_treated(&self) -> bool {
        matches!(self, Cohort::NeverTreated)
    }
}

/// `PanelData` — validated, balanced panel in wide layout.
///
/// Fields
/// ------
/// - `outcomes`: `Array2<f64>` of shape `(T, N)`.
/// - `instruments`: `Array2<f64>` of shape `(N, L)`.
/// - `units`: sorted distinct unit identifiers (length `N`).
/// - `periods`: sorted distinct periods (length `T`).
/// - `cohorts`: cohort of each unit, aligned with `units`.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelData {
    pub outcomes: Array2<f64>,
    pub instruments: Array2<f64>,
    pub units: Vec<i64>,
    pub periods: Vec<i64>,
    pub cohorts: Vec<Cohort>,
}

impl PanelData {
    /// Build a validated panel from long-format columns.
    ///
    /// Parameters
    /// ----------
    /// - `outcome`: outcome per row.
    /// - `unit`: unit identifier per row.
    /// - `period`: period per row.
    /// - `cohort`: cohort per row; must be constant within a unit.
    /// - `instruments`: `rows × L` instrument values. Only each unit's
    ///   first-period row is used.
    ///
    /// Errors
    /// ------
    /// - `PanelError::EmptyPanel`, `ColumnLengthMismatch`, `NoInstruments`
    ///   for malformed columns.
    /// - `PanelError::NonFiniteValue` for NaN/±∞ outcomes or instruments.
    /// - `PanelError::DuplicateObservation`, `Unbalanced`,
    ///   `CohortChangesWithinUnit` for structural violations.
    /// - `PanelError::NoPreTreatmentPeriods`, `NoNeverTreated`, `NoTreated`
    ///   for unusable cohort layouts.
    pub fn from_long(
        outcome: &[f64], unit: &[i64], period: &[i64], cohort: &[Cohort],
        instruments: ArrayView2<f64>,
    ) -> PanelResult<Self> {
        let n_obs = outcome.len();
        if n_obs == 0 {
            return Err(PanelError::EmptyPanel);
        }
        check_len("unit", n_obs, unit.len())?;
        check_len("time", n_obs, period.len())?;
        check_len("group", n_obs, cohort.len())?;
        check_len("instruments", n_obs, instruments.nrows())?;
        if instruments.ncols() == 0 {
            return Err(PanelError::NoInstruments);
        }
        check_finite("outcome", outcome.iter().copied())?;
        for col in instruments.columns() {
            check_finite("instruments", col.iter().copied())?;
        }

        let units = sorted_distinct(unit);
        let periods = sorted_distinct(period);
        let (n_units, n_periods) = (units.len(), periods.len());

        let mut row_of: Vec<Option<usize>> = vec![None; n_units * n_periods];
        let mut unit_cohort: Vec<Option<Cohort>> = vec![None; n_units];
        for row in 0..n_obs {
            let i = position(&units, unit[row]);
            let t = position(&periods, period[row]);
            let slot = &mut row_of[i * n_periods + t];
            if slot.is_some() {
                return Err(PanelError::DuplicateObservation { unit: unit[row], period: period[row] });
            }
            *slot = Some(row);
            match unit_cohort[i] {
                None => unit_cohort[i] = Some(cohort[row]),
                Some(c) if c != cohort[row] => {
                    return Err(PanelError::CohortChangesWithinUnit { unit: unit[row] });
                }
                Some(_) => {}
            }
        }

        let mut outcomes = Array2::<f64>::zeros((n_periods, n_units));
        let mut instr = Array2::<f64>::zeros((n_units, instruments.ncols()));
        for (i, &id) in units.iter().enumerate() {
            let rows = &row_of[i * n_periods..(i + 1) * n_periods];
            let found = rows.iter().filter(|r| r.is_some()).count();
            if found != n_periods {
                return Err(PanelError::Unbalanced { unit: id, expected: n_periods, found });
            }
            for (t, row) in rows.iter().enumerate() {
                if let Some(row) = *row {
                    outcomes[[t, i]] = outcome[row];
                }
            }
            if let Some(first) = rows[0] {
                instr.row_mut(i).assign(&instruments.row(first));
            }
        }

        // Every unit index was visited at least once, so each slot is filled.
        let cohorts: Vec<Cohort> =
            unit_cohort.into_iter().map(|c| c.unwrap_or(Cohort::NeverTreated)).collect();
        for (&id, c) in units.iter().zip(&cohorts) {
            if let Cohort::Treated(adoption) = *c {
                if adoption <= periods[0] {
                    return Err(PanelError::NoPreTreatmentPeriods { unit: id, adoption });
                }
            }
        }
        if !cohorts.iter().any(Cohort::is_never_treated) {
            return Err(PanelError::NoNeverTreated);
        }
        if cohorts.iter().all(Cohort::is_never_treated) {
            return Err(PanelError::NoTreated);
        }

        Ok(Self { outcomes, instruments: instr, units, periods, cohorts })
    }

    pub fn n_periods(&self) -> usize {
        self.periods.len()
    }

    pub fn n_units(&self) -> usize {
        self.units.len()
    }

    pub fn n_instruments(&self) -> usize {
        self.instruments.ncols()
    }

    /// Column indices of never-treated units.
    pub fn never_treated(&self) -> Vec<usize> {
        self.cohorts
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_never_treated())
            .map(|(i, _)| i)
            .collect()
    }
}

// ---- Helper methods ----

fn check_len(column: &str, expected: usize, found: usize) -> PanelResult<()> {
    if expected != found {
        return Err(PanelError::ColumnLengthMismatch { column: column.to_string(), expected, found });
    }
    Ok(())
}

fn check_finite(column: &str, values: impl Iterator<Item = f64>) -> PanelResult<()> {
    for (row, value) in values.enumerate() {
        if !value.is_finite() {
            return Err(PanelError::NonFiniteValue { column: column.to_string(), row, value });
        }
    }
    Ok(())
}

fn sorted_distinct(values: &[i64]) -> Vec<i64> {
    let mut out = values.to_vec();
    out.sort_unstable();
    out.dedup();
    out
}

fn position(sorted: &[i64], value: i64) -> usize {
    sorted.partition_point(|&v| v < value)
}

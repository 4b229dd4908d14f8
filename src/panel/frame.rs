//! String-keyed column store at the panel-loading boundary.
//!
//! Tabular loaders hand over numeric columns by name. [`PanelFrame`] holds
//! those columns, [`ColumnSpec`] names the roles, and
//! [`PanelData::from_frame`] converts them into a validated panel. This is
//! the only place where the `+∞` "never treated" group code is interpreted;
//! past this point cohorts are [`Cohort`] values.
use crate::panel::{
    data::{Cohort, PanelData},
    errors::{PanelError, PanelResult},
};
use ndarray::Array2;
use std::collections::HashMap;

/// Largest magnitude at which every integer is exactly representable.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Named numeric columns of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelFrame {
    columns: HashMap<String, Vec<f64>>,
}

impl PanelFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a column, builder style.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.columns.insert(name.into(), values);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.columns.insert(name.into(), values);
    }

    /// Borrow a column by name.
    ///
    /// # Errors
    /// `PanelError::MissingColumn` if `name` is absent.
    pub fn column(&self, name: &str) -> PanelResult<&[f64]> {
        self.columns
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| PanelError::MissingColumn { name: name.to_string() })
    }
}

/// Column roles for [`PanelData::from_frame`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub outcome: String,
    pub unit: String,
    pub time: String,
    /// Adoption period per row; `+∞` marks never-treated units.
    pub group: String,
    pub instruments: Vec<String>,
}

impl ColumnSpec {
    pub fn new(
        outcome: impl Into<String>, unit: impl Into<String>, time: impl Into<String>,
        group: impl Into<String>, instruments: &[&str],
    ) -> Self {
        Self {
            outcome: outcome.into(),
            unit: unit.into(),
            time: time.into(),
            group: group.into(),
            instruments: instruments.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PanelData {
    /// Build a validated panel from named columns.
    ///
    /// Unit and time columns must hold integers. The group column holds an
    /// integer adoption period or `+∞` for never-treated rows; NaN, `−∞`,
    /// and fractional values are rejected.
    ///
    /// # Errors
    /// - `PanelError::MissingColumn`, `NoInstruments`, `NonIntegerValue`,
    ///   `NonFiniteValue`, `InvalidCohort` for column-level problems.
    /// - Everything [`PanelData::from_long`] reports.
    pub fn from_frame(frame: &PanelFrame, spec: &ColumnSpec) -> PanelResult<Self> {
        let outcome = frame.column(&spec.outcome)?;
        let unit = to_integers(&spec.unit, frame.column(&spec.unit)?)?;
        let time = to_integers(&spec.time, frame.column(&spec.time)?)?;
        let cohort = to_cohorts(frame.column(&spec.group)?)?;
        if spec.instruments.is_empty() {
            return Err(PanelError::NoInstruments);
        }

        let n = outcome.len();
        let mut instruments = Array2::<f64>::zeros((n, spec.instruments.len()));
        for (l, name) in spec.instruments.iter().enumerate() {
            let col = frame.column(name)?;
            if col.len() != n {
                return Err(PanelError::ColumnLengthMismatch {
                    column: name.clone(),
                    expected: n,
                    found: col.len(),
                });
            }
            for (row, &v) in col.iter().enumerate() {
                instruments[[row, l]] = v;
            }
        }

        PanelData::from_long(outcome, &unit, &time, &cohort, instruments.view())
    }
}

// ---- Helper methods ----

fn to_integers(column: &str, values: &[f64]) -> PanelResult<Vec<i64>> {
    values
        .iter()
        .enumerate()
        .map(|(row, &value)| {
            if !value.is_finite() {
                return Err(PanelError::NonFiniteValue { column: column.to_string(), row, value });
            }
            if value.fract() != 0.0 || value.abs() > MAX_EXACT_INT {
                return Err(PanelError::NonIntegerValue { column: column.to_string(), row, value });
            }
            Ok(value as i64)
        })
        .collect()
}

fn to_cohorts(values: &[f64]) -> PanelResult<Vec<Cohort>> {
    values
        .iter()
        .enumerate()
        .map(|(row, &value)| {
            if value.is_nan() {
                return Err(PanelError::InvalidCohort { row, value, reason: "group is NaN" });
            }
            if value.is_infinite() {
                return if value > 0.0 {
                    Ok(Cohort::NeverTreated)
                } else {
                    Err(PanelError::InvalidCohort { row, value, reason: "only +inf marks never-treated" })
                };
            }
            if value.fract() != 0.0 || value.abs() > MAX_EXACT_INT {
                return Err(PanelError::InvalidCohort {
                    row,
                    value,
                    reason: "adoption period must be an integer",
                });
            }
            Ok(Cohort::Treated(value as i64))
        })
        .collect()
}

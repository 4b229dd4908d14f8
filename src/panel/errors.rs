//! Errors for panel construction and validation.
//!
//! [`PanelError`] covers everything that can be wrong with the raw long-format
//! panel before any estimation starts: missing or ragged columns, non-finite
//! values, duplicated or missing (unit, period) cells, cohorts that change
//! within a unit, and panels without a usable control group.
//!
//! ## Conventions
//! - Row indices are 0-based positions in the long-format input.
//! - Unit and period identifiers are reported as given by the caller.

/// Result alias for panel construction and validation.
pub type PanelResult<T> = Result<T, PanelError>;

#[derive(Debug, Clone, PartialEq)]
pub enum PanelError {
    // ---- Columns ----
    /// No observations were supplied.
    EmptyPanel,

    /// A requested column does not exist in the frame.
    MissingColumn { name: String },

    /// A column's length differs from the outcome column.
    ColumnLengthMismatch { column: String, expected: usize, found: usize },

    /// At least one instrument column is required.
    NoInstruments,

    // ---- Values ----
    /// A numeric entry is NaN or ±∞ where a finite value is required.
    NonFiniteValue { column: String, row: usize, value: f64 },

    /// An identifier or period entry is not an integer.
    NonIntegerValue { column: String, row: usize, value: f64 },

    /// A group entry is neither a finite integer period nor +∞.
    InvalidCohort { row: usize, value: f64, reason: &'static str },

    // ---- Structure ----
    /// The same (unit, period) pair appears more than once.
    DuplicateObservation { unit: i64, period: i64 },

    /// A unit does not cover every period observed in the panel.
    Unbalanced { unit: i64, expected: usize, found: usize },

    /// A unit is assigned to more than one treatment cohort.
    CohortChangesWithinUnit { unit: i64 },

    /// No never-treated units are available to identify the factor model.
    NoNeverTreated,

    /// Every unit is never-treated; there is nothing to impute.
    NoTreated,

    /// A cohort adopts treatment at or before the first observed period.
    NoPreTreatmentPeriods { unit: i64, adoption: i64 },
}

impl std::error::Error for PanelError {}

impl std::fmt::Display for PanelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Columns ----
            PanelError::EmptyPanel => write!(f, "Panel Error: no observations supplied"),
            PanelError::MissingColumn { name } => {
                write!(f, "Panel Error: column '{name}' not found")
            }
            PanelError::ColumnLengthMismatch { column, expected, found } => write!(
                f,
                "Panel Error: column '{column}' has {found} rows, expected {expected}"
            ),
            PanelError::NoInstruments => {
                write!(f, "Panel Error: at least one instrument column is required")
            }

            // ---- Values ----
            PanelError::NonFiniteValue { column, row, value } => {
                write!(f, "Panel Error: non-finite value {value} in '{column}' at row {row}")
            }
            PanelError::NonIntegerValue { column, row, value } => {
                write!(f, "Panel Error: non-integer value {value} in '{column}' at row {row}")
            }
            PanelError::InvalidCohort { row, value, reason } => {
                write!(f, "Panel Error: invalid group value {value} at row {row}: {reason}")
            }

            // ---- Structure ----
            PanelError::DuplicateObservation { unit, period } => {
                write!(f, "Panel Error: duplicate observation for unit {unit} in period {period}")
            }
            PanelError::Unbalanced { unit, expected, found } => write!(
                f,
                "Panel Error: panel is not balanced; unit {unit} has {found} periods, expected {expected}"
            ),
            PanelError::CohortChangesWithinUnit { unit } => {
                write!(f, "Panel Error: unit {unit} is assigned to more than one group")
            }
            PanelError::NoNeverTreated => {
                write!(f, "Panel Error: no never-treated units to identify the factor model")
            }
            PanelError::NoTreated => write!(f, "Panel Error: no treated units in the panel"),
            PanelError::NoPreTreatmentPeriods { unit, adoption } => write!(
                f,
                "Panel Error: unit {unit} adopts treatment in period {adoption}, leaving no pre-treatment periods"
            ),
        }
    }
}

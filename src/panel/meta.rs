//! Derived panel metadata: control set, pre-treatment window, and the
//! group-time cell layout shared by imputation, variance, and aggregation.
//!
//! A *cell* is a (treatment cohort, period) pair. Cells are indexed
//! `group * T + t`, where groups are ordered by adoption period and `t`
//! indexes the sorted panel periods. Every group owns a cell for every
//! period, pre-treatment periods included.
use crate::panel::data::{Cohort, PanelData};

/// One treatment cohort in the cell layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    /// Calendar adoption period.
    pub adoption: i64,
    /// Number of observed periods strictly before adoption.
    pub shift: usize,
    /// Column indices of member units.
    pub members: Vec<usize>,
}

/// Group-time cell layout.
#[derive(Debug, Clone, PartialEq)]
pub struct CellLayout {
    periods: Vec<i64>,
    groups: Vec<GroupInfo>,
    unit_group: Vec<Option<usize>>,
}

impl CellLayout {
    /// Build the layout from sorted periods and per-unit cohorts.
    pub fn new(periods: &[i64], cohorts: &[Cohort]) -> Self {
        let mut adoptions: Vec<i64> = cohorts.iter().filter_map(Cohort::adoption).collect();
        adoptions.sort_unstable();
        adoptions.dedup();

        let mut groups: Vec<GroupInfo> = adoptions
            .iter()
            .map(|&adoption| GroupInfo {
                adoption,
                shift: periods.partition_point(|&p| p < adoption),
                members: Vec::new(),
            })
            .collect();
        let mut unit_group = vec![None; cohorts.len()];
        for (i, c) in cohorts.iter().enumerate() {
            if let Some(a) = c.adoption() {
                let g = adoptions.partition_point(|&x| x < a);
                groups[g].members.push(i);
                unit_group[i] = Some(g);
            }
        }
        Self { periods: periods.to_vec(), groups, unit_group }
    }

    pub fn n_periods(&self) -> usize {
        self.periods.len()
    }

    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn n_units(&self) -> usize {
        self.unit_group.len()
    }

    pub fn n_cells(&self) -> usize {
        self.groups.len() * self.periods.len()
    }

    pub fn periods(&self) -> &[i64] {
        &self.periods
    }

    pub fn groups(&self) -> &[GroupInfo] {
        &self.groups
    }

    /// Group index of unit `i`, `None` for never-treated units.
    pub fn unit_group(&self, i: usize) -> Option<usize> {
        self.unit_group[i]
    }

    #[inline]
    pub fn cell(&self, group: usize, t: usize) -> usize {
        group * self.periods.len() + t
    }

    /// `(adoption period, calendar period)` for every cell, in cell order.
    pub fn cell_keys(&self) -> Vec<(i64, i64)> {
        self.groups
            .iter()
            .flat_map(|g| self.periods.iter().map(move |&p| (g.adoption, p)))
            .collect()
    }

    /// Units contributing to each cell.
    pub fn cell_counts(&self) -> Vec<usize> {
        self.groups
            .iter()
            .flat_map(|g| std::iter::repeat(g.members.len()).take(self.periods.len()))
            .collect()
    }

    /// `period − adoption` for every cell.
    pub fn relative_times(&self) -> Vec<i64> {
        self.cell_keys().into_iter().map(|(g, p)| p - g).collect()
    }

    /// `true` for cells with `period ≥ adoption`.
    pub fn post_treatment(&self) -> Vec<bool> {
        self.cell_keys().into_iter().map(|(g, p)| p >= g).collect()
    }
}

/// Shapes and index sets derived once per estimation call.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelMeta {
    pub n_periods: usize,
    pub n_units: usize,
    pub n_instruments: usize,
    /// Column indices of never-treated units.
    pub controls: Vec<usize>,
    /// Common pre-treatment window: the smallest group shift.
    pub pre_periods: usize,
    pub cells: CellLayout,
}

impl PanelMeta {
    pub fn from_panel(panel: &PanelData) -> Self {
        let cells = CellLayout::new(&panel.periods, &panel.cohorts);
        let pre_periods = cells.groups().iter().map(|g| g.shift).min().unwrap_or(0);
        Self {
            n_periods: panel.n_periods(),
            n_units: panel.n_units(),
            n_instruments: panel.n_instruments(),
            controls: panel.never_treated(),
            pre_periods,
            cells,
        }
    }
}

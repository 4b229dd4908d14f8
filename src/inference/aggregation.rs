//! Aggregation of group-time effects into reported targets.
//!
//! Each target is a matrix `A` (`targets × cells`) applied as `A τ` to the
//! estimates and `IF Aᵀ` to the influence function. Event-study and overall
//! rows weight cells by their unit counts and sum to one.
use crate::inference::errors::{InferenceError, InferenceResult};
use crate::panel::CellLayout;
use ndarray::{Array1, Array2, ArrayView2};

/// Identity over all cells.
pub fn group_time_matrix(cells: &CellLayout) -> Array2<f64> {
    Array2::eye(cells.n_cells())
}

/// One row per distinct relative time `period − adoption`, ascending.
///
/// Returns the matrix and the relative-time label of each row.
pub fn event_study_matrix(cells: &CellLayout) -> (Array2<f64>, Vec<i64>) {
    let relative = cells.relative_times();
    let counts = cells.cell_counts();
    let mut labels = relative.clone();
    labels.sort_unstable();
    labels.dedup();

    let mut matrix = Array2::<f64>::zeros((labels.len(), cells.n_cells()));
    for (cell, (&e, &n)) in relative.iter().zip(&counts).enumerate() {
        if let Ok(row) = labels.binary_search(&e) {
            matrix[[row, cell]] = n as f64;
        }
    }
    normalize_rows(&mut matrix);
    (matrix, labels)
}

/// Single row over post-treatment cells (`period ≥ adoption`).
///
/// # Errors
/// `InferenceError::NoPostTreatmentCells` when no cell is post-treatment.
pub fn overall_matrix(cells: &CellLayout) -> InferenceResult<Array2<f64>> {
    let mut matrix = Array2::<f64>::zeros((1, cells.n_cells()));
    for (cell, (post, n)) in cells.post_treatment().into_iter().zip(cells.cell_counts()).enumerate() {
        if post {
            matrix[[0, cell]] = n as f64;
        }
    }
    if matrix.sum() <= 0.0 {
        return Err(InferenceError::NoPostTreatmentCells);
    }
    normalize_rows(&mut matrix);
    Ok(matrix)
}

/// Apply `A` to estimates and influence function.
///
/// # Errors
/// `InferenceError::DimensionMismatch` if `A`'s columns differ from the
/// number of cells in `tau` or `influence`.
pub fn aggregate(
    matrix: &Array2<f64>, tau: &Array1<f64>, influence: ArrayView2<f64>,
) -> InferenceResult<(Array1<f64>, Array2<f64>)> {
    for (what, found) in [("cell effects", tau.len()), ("influence columns", influence.ncols())] {
        if found != matrix.ncols() {
            return Err(InferenceError::DimensionMismatch { what, expected: matrix.ncols(), found });
        }
    }
    Ok((matrix.dot(tau), influence.dot(&matrix.t())))
}

fn normalize_rows(matrix: &mut Array2<f64>) {
    for mut row in matrix.rows_mut() {
        let total = row.sum();
        if total > 0.0 {
            row /= total;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::Cohort;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Row normalization, relative-time labelling, post-treatment masking, and
    // application to estimates and influence functions.
    // -------------------------------------------------------------------------

    /// Periods 1..=4; cohort 3 with two units, cohort 4 with one.
    fn layout() -> CellLayout {
        CellLayout::new(
            &[1, 2, 3, 4],
            &[Cohort::NeverTreated, Cohort::Treated(3), Cohort::Treated(3), Cohort::Treated(4)],
        )
    }

    #[test]
    // Purpose
    // -------
    // Event-study rows are count-weighted, labelled, and sum to one.
    //
    // Given
    // -----
    // - Relative times −2..1 (count 2) and −3..0 (count 1).
    //
    // Expect
    // ------
    // - Labels −3..=1; the row for 0 weights cells (3,3) and (4,4) by 2/3, 1/3.
    fn event_study_rows_are_normalized() {
        // Act
        let (matrix, labels) = event_study_matrix(&layout());

        // Assert
        assert_eq!(labels, vec![-3, -2, -1, 0, 1]);
        for row in matrix.rows() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(matrix[[3, 2]], 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(matrix[[3, 7]], 1.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(matrix[[0, 4]], 1.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // The overall row covers post-treatment cells only.
    //
    // Given
    // -----
    // - Post cells (3,3), (3,4) with count 2 and (4,4) with count 1.
    //
    // Expect
    // ------
    // - Weights 0.4, 0.4, 0.2 on cells 2, 3, 7 and zero elsewhere.
    fn overall_row_weights_post_cells() {
        // Act
        let matrix = overall_matrix(&layout()).expect("overall");

        // Assert
        let expected = array![[0.0, 0.0, 0.4, 0.4, 0.0, 0.0, 0.0, 0.2]];
        for (a, b) in matrix.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // A layout with no post-treatment cell cannot form an overall effect.
    //
    // Given
    // -----
    // - Adoption at period 9 in a panel ending at period 4.
    //
    // Expect
    // ------
    // - `NoPostTreatmentCells`.
    fn overall_without_post_cells_is_error() {
        // Arrange
        let cells = CellLayout::new(&[1, 2, 3, 4], &[Cohort::NeverTreated, Cohort::Treated(9)]);

        // Act / Assert
        assert_eq!(overall_matrix(&cells), Err(InferenceError::NoPostTreatmentCells));
    }

    #[test]
    // Purpose
    // -------
    // Aggregation maps estimates by `Aτ` and influence by `IF Aᵀ`.
    //
    // Given
    // -----
    // - A = [[0.5, 0.5]], τ = (1, 3), IF = [[1, 0], [0, 2]].
    //
    // Expect
    // ------
    // - Estimate 2; influence column (0.5, 1).
    fn aggregate_applies_matrix_to_both_sides() {
        // Arrange
        let a = array![[0.5, 0.5]];

        // Act
        let (est, inf) =
            aggregate(&a, &array![1.0, 3.0], array![[1.0, 0.0], [0.0, 2.0]].view()).expect("agg");

        // Assert
        assert_eq!(est, array![2.0]);
        assert_eq!(inf, array![[0.5], [1.0]]);
        assert!(matches!(
            aggregate(&a, &array![1.0], array![[1.0, 0.0]].view()),
            Err(InferenceError::DimensionMismatch { .. })
        ));
        assert_eq!(group_time_matrix(&layout()).dim(), (8, 8));
    }
}

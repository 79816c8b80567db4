// src/row_ops.rs

use crate::matrix::{is_zero, Column, Matrix};

/// An elementary row operation recorded by the elimination engine.
///
/// Operations carry row indices and scalars only, so a recorded operation can be
/// replayed against any matrix with the same number of rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowOp {
    /// Exchanges rows `first` and `second`.
    Swap { first: usize, second: usize },
    /// Multiplies `row` by `factor`.
    Scale { row: usize, factor: f64 },
    /// `target -= scale * source`.
    ScaleSubtract {
        source: usize,
        target: usize,
        scale: f64,
    },
}

impl RowOp {
    /// Rows this operation writes to.
    pub fn written_rows(&self) -> Vec<usize> {
        match *self {
            RowOp::Swap { first, second } => vec![first, second],
            RowOp::Scale { row, .. } => vec![row],
            RowOp::ScaleSubtract { target, .. } => vec![target],
        }
    }

    /// Applies the operation to `matrix` in place.
    pub fn apply(&self, matrix: &mut Matrix) {
        match *self {
            RowOp::Swap { first, second } => swap_rows(matrix, first, second),
            RowOp::Scale { row, factor } => {
                matrix.row_mut(row).mapv_inplace(|v| v * factor);
            }
            RowOp::ScaleSubtract {
                source,
                target,
                scale,
            } => {
                let source_row = matrix.row(source).to_owned();
                matrix.row_mut(target).scaled_add(-scale, &source_row);
            }
        }
    }

    /// Computes the rows this operation would write without touching `matrix`.
    ///
    /// Used by the parallel stage executor: every operation of a stage is evaluated
    /// against the same snapshot and the results are written back afterwards.
    pub(crate) fn evaluate(&self, matrix: &Matrix) -> Vec<(usize, Column)> {
        match *self {
            RowOp::Swap { first, second } => vec![
                (first, matrix.row(second).to_owned()),
                (second, matrix.row(first).to_owned()),
            ],
            RowOp::Scale { row, factor } => vec![(row, matrix.row(row).mapv(|v| v * factor))],
            RowOp::ScaleSubtract {
                source,
                target,
                scale,
            } => {
                let mut values = matrix.row(target).to_owned();
                values.scaled_add(-scale, &matrix.row(source));
                vec![(target, values)]
            }
        }
    }
}

/// Exchanges two rows of `matrix` in place.
pub fn swap_rows(matrix: &mut Matrix, first: usize, second: usize) {
    if first == second {
        return;
    }
    let first_row = matrix.row(first).to_owned();
    let second_row = matrix.row(second).to_owned();
    matrix.row_mut(first).assign(&second_row);
    matrix.row_mut(second).assign(&first_row);
}

/// Looks below `pivot_row` for a row with a nonzero entry in `col` and swaps it into place.
///
/// Returns the swap that was performed, or `None` if every row below is zero in `col`.
pub fn swap_nonzero(matrix: &mut Matrix, pivot_row: usize, col: usize) -> Option<RowOp> {
    let candidate = (pivot_row + 1..matrix.nrows()).find(|&row| !is_zero(matrix[[row, col]]))?;
    let op = RowOp::Swap {
        first: pivot_row,
        second: candidate,
    };
    op.apply(matrix);
    Some(op)
}

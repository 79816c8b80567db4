// src/matrix.rs

use crate::error::LinalgError;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Dense, row-major matrix of `f64` used by every part of the engine.
pub type Matrix = Array2<f64>;

/// A single column (or row) of values.
pub type Column = Array1<f64>;

/// Magnitude below which an entry is treated as zero.
///
/// Applies to pivot detection, pivot scanning and the consistency test of the solver.
pub const ZERO_TOLERANCE: f64 = 1e-10;

/// Returns `true` if `value` is considered zero by the elimination engine.
#[inline]
pub fn is_zero(value: f64) -> bool {
    value.abs() < ZERO_TOLERANCE
}

/// Location of a pivot (leading nonzero entry) inside a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PivotPosition {
    pub row: usize,
    pub col: usize,
}

impl PivotPosition {
    pub fn new(row: usize, col: usize) -> Self {
        PivotPosition { row, col }
    }
}

/// Scans `matrix` top to bottom and returns its pivot positions.
///
/// For each row, the first nonzero entry at or after the previous pivot's column + 1 is
/// recorded. Rows without such an entry have no pivot. The returned column indices are
/// strictly increasing.
pub fn pivot_positions(matrix: &Matrix) -> Vec<PivotPosition> {
    let mut pivots = Vec::new();
    let mut start_col = 0;
    for (row, values) in matrix.outer_iter().enumerate() {
        if let Some(col) = first_nonzero(values, start_col) {
            pivots.push(PivotPosition::new(row, col));
            start_col = col + 1;
        }
    }
    pivots
}

fn first_nonzero(values: ArrayView1<'_, f64>, start: usize) -> Option<usize> {
    (start..values.len()).find(|&col| !is_zero(values[col]))
}

/// Matrix product `a · b` with an explicit inner-dimension check.
///
/// `ndarray`'s `dot` panics on mismatched shapes; this variant reports a
/// `LinalgError::ShapeMismatch` naming `operation` instead.
pub fn matmul(
    a: ArrayView2<'_, f64>,
    b: ArrayView2<'_, f64>,
    operation: &str,
) -> Result<Matrix, LinalgError> {
    if a.ncols() != b.nrows() {
        return Err(LinalgError::ShapeMismatch {
            expected: vec![a.ncols(), b.ncols()],
            actual: vec![b.nrows(), b.ncols()],
            operation: operation.to_string(),
        });
    }
    Ok(a.dot(&b))
}

/// Turns a column view into an `n x 1` matrix.
pub fn column_matrix(column: ArrayView1<'_, f64>) -> Matrix {
    column.to_owned().insert_axis(Axis(1))
}

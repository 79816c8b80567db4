use crate::matrix::Matrix;
use approx::abs_diff_eq;

/// Checks if two matrices are approximately equal (shape and data within tolerance).
/// Panics if shapes differ or any entry differs by more than `tolerance`.
pub fn check_matrix_near(actual: &Matrix, expected: &Matrix, tolerance: f64) {
    assert_eq!(actual.dim(), expected.dim(), "Shape mismatch");

    for ((index, a), e) in actual.indexed_iter().zip(expected.iter()) {
        if !abs_diff_eq!(*a, *e, epsilon = tolerance) {
            panic!(
                "Data mismatch at index {:?}: actual={:?}, expected={:?}, diff={:?}, tolerance={:?}",
                index,
                a,
                e,
                (a - e).abs(),
                tolerance
            );
        }
    }
}

/// Returns `true` if every entry of `actual` is within `tolerance` of `expected`.
pub fn matrix_near(actual: &Matrix, expected: &Matrix, tolerance: f64) -> bool {
    actual.dim() == expected.dim()
        && actual
            .iter()
            .zip(expected.iter())
            .all(|(a, e)| abs_diff_eq!(*a, *e, epsilon = tolerance))
}

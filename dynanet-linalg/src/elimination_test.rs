// src/elimination_test.rs

use super::*;
use crate::matrix::{pivot_positions, Matrix};
use crate::utils::testing::check_matrix_near;
use ndarray::{array, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::ThreadPoolBuilder;
use std::sync::Once;

static LOGGER_INIT: Once = Once::new();

fn setup_logger() {
    LOGGER_INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize) -> Matrix {
    Array2::from_shape_simple_fn((rows, cols), || rng.gen_range(-1.0..1.0))
}

fn test_pool() -> ThreadPool {
    ThreadPoolBuilder::new()
        .num_threads(3)
        .build()
        .expect("Failed to build test thread pool")
}

#[test]
fn test_simple_elimination() {
    setup_logger();
    let mut m = array![[3.0, 0.0, 1.0], [3.0, 1.0, 1.0]];
    let log = eliminate(&mut m);
    assert_eq!(log.len(), 2);
    check_matrix_near(&m, &array![[1.0, 0.0, 1.0 / 3.0], [0.0, 1.0, 0.0]], 1e-12);
}

#[test]
fn test_scale_is_entry_over_pivot() {
    let mut m = array![[3.0, 1.0], [7.0, 2.0]];
    let log = eliminate(&mut m);
    assert_eq!(
        log.stages()[0].ops(),
        &[RowOp::ScaleSubtract {
            source: 0,
            target: 1,
            scale: 7.0 / 3.0,
        }]
    );
}

#[test]
fn test_forward_elimination_zero_column() {
    let mut m = array![[3.0, 0.0, 0.0, 1.0], [3.0, 0.0, 1.0, 1.0], [0.0, 0.0, 1.0, 1.0]];
    let log = eliminate(&mut m);
    assert_eq!(log.len(), 4);
    assert_eq!(
        m,
        array![[1.0, 0.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0], [0.0, 0.0, 0.0, 1.0]]
    );
}

#[test]
fn test_full_elimination() {
    let mut m = array![[21.0, 16.0, 13.0], [21.0, 18.0, 38.0], [24.0, 24.0, 6.0]];
    let log = eliminate(&mut m);
    assert_eq!(log.len(), 5);
    check_matrix_near(&m, &Array2::eye(3), 1e-13);
}

#[test]
fn test_full_elimination_with_pool() {
    setup_logger();
    let pool = test_pool();
    let mut m = array![[21.0, 16.0, 13.0], [21.0, 18.0, 38.0], [24.0, 24.0, 6.0]];
    let log = eliminate_with(&mut m, Some(&pool));
    assert_eq!(log.len(), 5);
    check_matrix_near(&m, &Array2::eye(3), 1e-13);
}

#[test]
fn test_zero_column_with_pool_matches_inline() {
    let pool = test_pool();
    let original = array![[3.0, 0.0, 0.0, 1.0], [3.0, 0.0, 1.0, 1.0], [0.0, 0.0, 1.0, 1.0]];
    let mut inline = original.clone();
    let mut pooled = original.clone();
    let inline_log = eliminate(&mut inline);
    let pooled_log = eliminate_with(&mut pooled, Some(&pool));
    assert_eq!(inline_log, pooled_log);
    assert_eq!(inline, pooled);
}

#[test]
fn test_leading_zero_pivot_records_swap_stage() {
    let mut m = array![[0.0, 2.0], [4.0, 1.0]];
    let log = eliminate(&mut m);
    assert_eq!(log.stages()[0].ops(), &[RowOp::Swap { first: 0, second: 1 }]);
    check_matrix_near(&m, &Array2::eye(2), 1e-15);
}

#[test]
fn test_reduced_matrix_is_left_unchanged() {
    let reduced = array![[1.0, 2.0, 0.0, 3.0], [0.0, 0.0, 1.0, -1.0], [0.0, 0.0, 0.0, 0.0]];
    let mut m = reduced.clone();
    let log = eliminate(&mut m);
    assert!(log.is_empty());
    assert_eq!(log.op_count(), 0);
    assert_eq!(m, reduced);

    // A second pass over freshly reduced output is a no-op as well.
    let mut once = array![[21.0, 16.0, 13.0], [21.0, 18.0, 38.0], [24.0, 24.0, 6.0]];
    eliminate(&mut once);
    let snapshot = once.clone();
    let second = eliminate(&mut once);
    assert!(second.is_empty());
    assert_eq!(once, snapshot);
}

#[test]
fn test_wide_matrix_with_skipped_columns() {
    let mut m = array![[0.0, 0.0, 1.0, 2.0], [0.0, 0.0, 3.0, 4.0]];
    let log = eliminate(&mut m);
    assert_eq!(log.len(), 3);
    check_matrix_near(&m, &array![[0.0, 0.0, 1.0, 0.0], [0.0, 0.0, 0.0, 1.0]], 1e-15);
}

#[test]
fn test_pivot_columns_strictly_increase() {
    let mut rng = StdRng::seed_from_u64(7);
    for (rows, cols) in [(3, 3), (4, 6), (6, 4), (5, 5), (2, 7)] {
        let mut m = random_matrix(&mut rng, rows, cols);
        eliminate(&mut m);
        let pivots = pivot_positions(&m);
        assert!(pivots.windows(2).all(|w| w[0].col < w[1].col && w[0].row < w[1].row));
        for pivot in &pivots {
            assert_eq!(m[[pivot.row, pivot.col]], 1.0);
            for row in 0..rows {
                if row != pivot.row {
                    assert_eq!(m[[row, pivot.col]], 0.0);
                }
            }
        }
    }
}

#[test]
fn test_stages_write_disjoint_rows() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut m = random_matrix(&mut rng, 6, 6);
    let log = eliminate(&mut m);
    assert!(log.stages().iter().all(Stage::has_disjoint_writes));
    assert!(log.stages().iter().all(|stage| !stage.is_empty()));
    assert_eq!(log.rows(), 6);
}

#[test]
fn test_replaying_log_on_identity_reproduces_reduction() {
    let mut rng = StdRng::seed_from_u64(3);
    let original = random_matrix(&mut rng, 4, 5);
    let mut reduced = original.clone();
    let log = eliminate(&mut reduced);

    // The log applied to the identity yields the matrix E with E * A = RREF(A).
    let mut transform: Matrix = Array2::eye(4);
    execute(&log, &mut transform, None).unwrap();
    check_matrix_near(&transform.dot(&original), &reduced, 1e-9);
}

#[test]
fn test_execute_with_pool_matches_inline() {
    let pool = test_pool();
    let mut rng = StdRng::seed_from_u64(5);
    let mut a = random_matrix(&mut rng, 5, 5);
    let log = eliminate(&mut a);
    let rhs = random_matrix(&mut rng, 5, 3);

    let mut inline = rhs.clone();
    execute(&log, &mut inline, None).unwrap();
    let mut pooled = rhs.clone();
    execute(&log, &mut pooled, Some(&pool)).unwrap();
    assert_eq!(inline, pooled);
}

#[test]
fn test_execute_rejects_row_count_mismatch() {
    let mut a = array![[1.0, 2.0], [3.0, 4.0]];
    let log = eliminate(&mut a);
    let mut wrong = array![[1.0], [2.0], [3.0]];
    let err = execute(&log, &mut wrong, None).unwrap_err();
    assert_eq!(
        err,
        LinalgError::ShapeMismatch {
            expected: vec![2],
            actual: vec![3],
            operation: "execute elimination log".to_string(),
        }
    );
}

#[test]
fn test_empty_matrix() {
    let mut m = Matrix::zeros((0, 3));
    let log = eliminate(&mut m);
    assert!(log.is_empty());
    assert_eq!(log.rows(), 0);
}

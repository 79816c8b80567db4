// src/solver_test.rs

use super::*;
use crate::elimination::eliminate;
use crate::utils::testing::{check_matrix_near, matrix_near};
use ndarray::{array, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::ThreadPoolBuilder;
use std::sync::Once;

static LOGGER_INIT: Once = Once::new();

fn setup_logger() {
    LOGGER_INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

#[test]
fn test_classify_unique() {
    let reduced: Matrix = Array2::eye(3);
    let column = array![4.0, -1.0, 2.5];
    let pivots = pivot_positions(&reduced);
    assert_eq!(classify(&reduced, column.view(), &pivots), SolveStatus::Unique);
}

#[test]
fn test_classify_infinite() {
    let reduced = array![[1.0, 0.0, -1.0], [0.0, 1.0, 2.0], [0.0, 0.0, 0.0]];
    let column = array![1.0, 2.0, 0.0];
    let pivots = pivot_positions(&reduced);
    assert_eq!(
        classify(&reduced, column.view(), &pivots),
        SolveStatus::Underdetermined
    );
}

#[test]
fn test_classify_no_solution() {
    let reduced = array![[1.0, 0.0, -1.0], [0.0, 1.0, 2.0], [0.0, 0.0, 0.0]];
    let column = array![1.0, 2.0, 3.0];
    let pivots = pivot_positions(&reduced);
    assert_eq!(
        classify(&reduced, column.view(), &pivots),
        SolveStatus::Inconsistent
    );
}

#[test]
fn test_classify_wide_full_row_rank_is_unique() {
    // Every row has a pivot; column 2 has none and stays at zero.
    let reduced = array![[1.0, 0.0, 3.0], [0.0, 1.0, -1.0]];
    let column = array![1.0, 1.0];
    let pivots = pivot_positions(&reduced);
    assert_eq!(classify(&reduced, column.view(), &pivots), SolveStatus::Unique);
}

#[test]
fn test_solve_wide_system_is_deterministic() {
    let a = array![[1.0, 1.0]];
    let y = array![[2.0]];
    let mut rng = StdRng::seed_from_u64(3);
    let report = LinearSolver::new()
        .solve_report(a.view(), y.view(), None, &mut rng)
        .unwrap();
    assert_eq!(report.columns[0].direct, SolveStatus::Unique);
    assert_eq!(report.solution, array![[2.0], [0.0]]);

    for _ in 0..3 {
        assert_eq!(solve(a.view(), y.view()).unwrap(), array![[2.0], [0.0]]);
    }
}

#[test]
fn test_solve_identity() {
    setup_logger();
    let identity: Matrix = Array2::eye(3);
    let y = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
    let x = solve(identity.view(), y.view()).unwrap();
    assert_eq!(x, y);

    // Transposed views are accepted as-is.
    let identity2: Matrix = Array2::eye(2);
    let xt = solve(identity2.view(), y.t()).unwrap();
    assert_eq!(xt, y.t());
}

#[test]
fn test_solve_invertible_system() {
    let a = array![[1.0, 2.0, 1.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
    let y = array![[24.0, 20.0, 16.0], [84.0, 69.0, 54.0], [138.0, 114.0, 90.0]];
    let x = solve(a.view(), y.view()).unwrap();
    check_matrix_near(
        &x,
        &array![[9.0, 8.0, 7.0], [6.0, 5.0, 4.0], [3.0, 2.0, 1.0]],
        1e-9,
    );
}

#[test]
fn test_solve_rank_deficient_system_returns_a_solution() {
    setup_logger();
    let a = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
    let y = a.dot(&a.t());
    let solver = LinearSolver::new();

    let mut first_rng = StdRng::seed_from_u64(1);
    let first = solver.solve_report(a.view(), y.view(), None, &mut first_rng).unwrap();
    let mut second_rng = StdRng::seed_from_u64(2);
    let second = solver.solve_report(a.view(), y.view(), None, &mut second_rng).unwrap();

    check_matrix_near(&a.dot(&first.solution), &y, 1e-8);
    check_matrix_near(&a.dot(&second.solution), &y, 1e-8);
    assert!(first
        .columns
        .iter()
        .all(|outcome| outcome.direct == SolveStatus::Underdetermined && outcome.fallback.is_none()));
    // Different free-parameter draws give different members of the solution set.
    assert!(!matrix_near(&first.solution, &second.solution, 1e-6));
}

#[test]
fn test_inconsistent_column_falls_back_to_least_squares() {
    setup_logger();
    let a = array![[2.0, 3.0], [2.0, 3.0]];
    let y = array![[10.0], [12.0]];
    let mut rng = StdRng::seed_from_u64(9);
    let report = LinearSolver::new()
        .solve_report(a.view(), y.view(), None, &mut rng)
        .unwrap();

    assert_eq!(
        report.columns,
        vec![ColumnOutcome {
            direct: SolveStatus::Inconsistent,
            fallback: Some(SolveStatus::Underdetermined),
        }]
    );
    // Every least-squares solution maps to the mean of the two observations.
    check_matrix_near(&a.dot(&report.solution), &array![[11.0], [11.0]], 1e-9);
}

#[test]
fn test_fallback_only_for_inconsistent_columns() {
    let a = array![[2.0, 3.0], [2.0, 3.0]];
    let y = array![[10.0, 10.0], [10.0, 12.0]];
    let mut rng = StdRng::seed_from_u64(4);
    let report = LinearSolver::new()
        .solve_report(a.view(), y.view(), None, &mut rng)
        .unwrap();

    assert_eq!(report.columns[0].direct, SolveStatus::Underdetermined);
    assert_eq!(report.columns[0].fallback, None);
    assert_eq!(report.columns[1].direct, SolveStatus::Inconsistent);
    assert!(report.columns[1].fallback.is_some());
    check_matrix_near(
        &a.dot(&report.solution),
        &array![[10.0, 11.0], [10.0, 11.0]],
        1e-9,
    );
}

#[test]
fn test_solve_recovers_known_solution() {
    let a = array![[4.0, 1.0, 0.5], [1.0, 3.0, -1.0], [0.0, 2.0, 5.0]];
    let b = array![[1.0, -2.0], [0.5, 3.0], [-1.0, 0.25]];
    let y = a.dot(&b);
    let x = solve(a.view(), y.view()).unwrap();
    check_matrix_near(&x, &b, 1e-10);
}

#[test]
fn test_solve_tall_system() {
    // Three equations, two unknowns, consistent. The zero row has no pivot, so the
    // column is not unique, but there is no free column to draw for either.
    let a = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
    let y = array![[2.0], [3.0], [5.0]];
    let mut rng = StdRng::seed_from_u64(0);
    let report = LinearSolver::new()
        .solve_report(a.view(), y.view(), None, &mut rng)
        .unwrap();
    assert_eq!(report.columns[0].direct, SolveStatus::Underdetermined);
    check_matrix_near(&report.solution, &array![[2.0], [3.0]], 1e-12);
}

#[test]
fn test_solve_rejects_row_count_mismatch() {
    let a = array![[1.0, 0.0], [0.0, 1.0]];
    let y = array![[1.0], [2.0], [3.0]];
    let err = solve(a.view(), y.view()).unwrap_err();
    assert_eq!(
        err,
        LinalgError::ShapeMismatch {
            expected: vec![2, 1],
            actual: vec![3, 1],
            operation: "solve".to_string(),
        }
    );
}

#[test]
fn test_solve_with_precomputed_log() {
    let a = array![[21.0, 16.0, 13.0], [21.0, 18.0, 38.0], [24.0, 24.0, 6.0]];
    let y = array![[1.0, 0.0], [2.0, 1.0], [3.0, -1.0]];
    let mut reduced = a.clone();
    let log = eliminate(&mut reduced);

    let solver = LinearSolver::new();
    let with_log = solver.solve_with_log(reduced.view(), y.view(), &log).unwrap();
    let direct = solver.solve(a.view(), y.view()).unwrap();
    check_matrix_near(&with_log, &direct, 1e-10);
    check_matrix_near(&a.dot(&with_log), &y, 1e-9);
}

#[test]
fn test_pool_backed_solver_matches_inline() {
    setup_logger();
    let pool = ThreadPoolBuilder::new()
        .num_threads(2)
        .build()
        .expect("Failed to build test thread pool");
    let solver = LinearSolver::with_pool(&pool);
    assert!(solver.pool().is_some());

    let a = array![[1.0, 2.0, 1.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
    let y = array![[24.0, 20.0, 16.0], [84.0, 69.0, 54.0], [138.0, 114.0, 90.0]];
    let pooled = solver.solve(a.view(), y.view()).unwrap();
    let inline = LinearSolver::default().solve(a.view(), y.view()).unwrap();
    assert_eq!(pooled, inline);
}

// src/solver.rs

use crate::elimination::{eliminate_with, execute, EliminationLog};
use crate::error::LinalgError;
use crate::matrix::{column_matrix, is_zero, matmul, pivot_positions, Column, Matrix, PivotPosition};
use crate::solution::SolutionDescriptor;
use log::{debug, warn};
use ndarray::{ArrayView1, ArrayView2, Axis};
use rand::Rng;
use rayon::ThreadPool;

/// Solvability of one column of a linear system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    /// Exactly one solution.
    Unique,
    /// Infinitely many solutions.
    Underdetermined,
    /// No solution.
    Inconsistent,
}

/// How one column of the right-hand side was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnOutcome {
    /// Classification of the system as given.
    pub direct: SolveStatus,
    /// Classification of the normal equations, present only when `direct` was inconsistent.
    pub fallback: Option<SolveStatus>,
}

/// Solution matrix plus the per-column classification that produced it.
#[derive(Debug, Clone)]
pub struct SolveReport {
    pub solution: Matrix,
    pub columns: Vec<ColumnOutcome>,
}

/// Classifies `reduced · x = column`, where `reduced` is in RREF and `column`
/// has been replayed into its frame.
///
/// A row without a pivot must hold a zero in `column`, otherwise the system is
/// inconsistent. A consistent system is unique when every row of `reduced`
/// holds a pivot; the pivot variables then take `column[pivot_row]` and every
/// other unknown is zero.
pub fn classify(
    reduced: &Matrix,
    column: ArrayView1<'_, f64>,
    pivots: &[PivotPosition],
) -> SolveStatus {
    let mut has_pivot = vec![false; reduced.nrows()];
    for pivot in pivots {
        has_pivot[pivot.row] = true;
    }
    let inconsistent = has_pivot
        .iter()
        .enumerate()
        .any(|(row, &pivot)| !pivot && !is_zero(column[row]));
    if inconsistent {
        SolveStatus::Inconsistent
    } else if pivots.len() == reduced.nrows() {
        SolveStatus::Unique
    } else {
        SolveStatus::Underdetermined
    }
}

fn unique_solution(unknowns: usize, column: ArrayView1<'_, f64>, pivots: &[PivotPosition]) -> Column {
    let mut solution = Column::zeros(unknowns);
    for pivot in pivots {
        solution[pivot.col] = column[pivot.row];
    }
    solution
}

/// Solves `A · X = Y` column by column using staged Gauss-Jordan elimination.
///
/// The solver optionally borrows a thread pool, which is used for every
/// elimination and log replay it performs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearSolver<'p> {
    pool: Option<&'p ThreadPool>,
}

impl<'p> LinearSolver<'p> {
    /// A solver that applies every stage in-line.
    pub fn new() -> Self {
        LinearSolver { pool: None }
    }

    /// A solver that evaluates multi-operation stages on `pool`.
    pub fn with_pool(pool: &'p ThreadPool) -> Self {
        LinearSolver { pool: Some(pool) }
    }

    pub fn pool(&self) -> Option<&'p ThreadPool> {
        self.pool
    }

    /// Solves `A · X = Y`.
    ///
    /// Underdetermined columns receive one randomly chosen solution; inconsistent
    /// columns receive a least-squares solution from the normal equations.
    ///
    /// # Errors
    /// * `LinalgError::ShapeMismatch` if `A` and `Y` have different row counts.
    /// * `LinalgError::SolverExhausted` if the normal equations are inconsistent.
    pub fn solve(&self, a: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>) -> Result<Matrix, LinalgError> {
        let mut rng = rand::thread_rng();
        Ok(self.solve_report(a, y, None, &mut rng)?.solution)
    }

    /// Solves `A · X = Y` where `A` is already in the RREF produced by `log`.
    ///
    /// `log` is replayed on `Y` only; `A` is not eliminated again.
    pub fn solve_with_log(
        &self,
        a: ArrayView2<'_, f64>,
        y: ArrayView2<'_, f64>,
        log: &EliminationLog,
    ) -> Result<Matrix, LinalgError> {
        let mut rng = rand::thread_rng();
        Ok(self.solve_report(a, y, Some(log), &mut rng)?.solution)
    }

    /// Solves `A · X = Y` and reports how each column was classified.
    ///
    /// # Arguments
    /// * `a`: Coefficient matrix.
    /// * `y`: Right-hand sides, one per column.
    /// * `known_log`: If given, `a` is taken to be in RREF already and the log is only
    ///   replayed on `y`.
    /// * `rng`: Source of the free-parameter values of underdetermined columns.
    pub fn solve_report<R: Rng + ?Sized>(
        &self,
        a: ArrayView2<'_, f64>,
        y: ArrayView2<'_, f64>,
        known_log: Option<&EliminationLog>,
        rng: &mut R,
    ) -> Result<SolveReport, LinalgError> {
        if a.nrows() != y.nrows() {
            return Err(LinalgError::ShapeMismatch {
                expected: vec![a.nrows(), y.ncols()],
                actual: vec![y.nrows(), y.ncols()],
                operation: "solve".to_string(),
            });
        }

        let mut reduced = a.to_owned();
        let derived_log;
        let log = match known_log {
            Some(log) => log,
            None => {
                derived_log = eliminate_with(&mut reduced, self.pool);
                &derived_log
            }
        };
        let mut rhs = y.to_owned();
        execute(log, &mut rhs, self.pool)?;
        let pivots = pivot_positions(&reduced);

        let unknowns = a.ncols();
        let mut solution = Matrix::zeros((unknowns, y.ncols()));
        let mut columns = Vec::with_capacity(y.ncols());
        let mut normal_system: Option<NormalSystem> = None;

        for (index, column) in rhs.axis_iter(Axis(1)).enumerate() {
            let direct = classify(&reduced, column, &pivots);
            let (values, fallback) = match direct {
                SolveStatus::Unique => (unique_solution(unknowns, column, &pivots), None),
                SolveStatus::Underdetermined => {
                    let descriptor = SolutionDescriptor::new(&reduced, column, &pivots);
                    (descriptor.sample(rng), None)
                }
                SolveStatus::Inconsistent => {
                    debug!("solve: column {} is inconsistent, falling back to normal equations", index);
                    if normal_system.is_none() {
                        normal_system = Some(NormalSystem::new(a, self.pool)?);
                    }
                    match normal_system.as_ref() {
                        Some(system) => {
                            let (values, status) = system.solve_column(y.column(index), index, self.pool, rng)?;
                            (values, Some(status))
                        }
                        None => return Err(LinalgError::SolverExhausted { column: index }),
                    }
                }
            };
            solution.column_mut(index).assign(&values);
            columns.push(ColumnOutcome { direct, fallback });
        }

        Ok(SolveReport { solution, columns })
    }
}

/// `Aᵀ·A` in reduced form, shared by every inconsistent column of one solve.
struct NormalSystem {
    transpose: Matrix,
    reduced: Matrix,
    log: EliminationLog,
    pivots: Vec<PivotPosition>,
}

impl NormalSystem {
    fn new(a: ArrayView2<'_, f64>, pool: Option<&ThreadPool>) -> Result<Self, LinalgError> {
        let transpose = a.t().to_owned();
        let mut reduced = matmul(transpose.view(), a, "normal equations")?;
        let log = eliminate_with(&mut reduced, pool);
        let pivots = pivot_positions(&reduced);
        Ok(NormalSystem {
            transpose,
            reduced,
            log,
            pivots,
        })
    }

    fn solve_column<R: Rng + ?Sized>(
        &self,
        column: ArrayView1<'_, f64>,
        index: usize,
        pool: Option<&ThreadPool>,
        rng: &mut R,
    ) -> Result<(Column, SolveStatus), LinalgError> {
        let mut rhs = matmul(self.transpose.view(), column_matrix(column).view(), "normal equations")?;
        execute(&self.log, &mut rhs, pool)?;
        let rhs = rhs.column(0);
        let unknowns = self.reduced.ncols();

        match classify(&self.reduced, rhs, &self.pivots) {
            SolveStatus::Unique => Ok((unique_solution(unknowns, rhs, &self.pivots), SolveStatus::Unique)),
            SolveStatus::Underdetermined => {
                let descriptor = SolutionDescriptor::new(&self.reduced, rhs, &self.pivots);
                Ok((descriptor.sample(rng), SolveStatus::Underdetermined))
            }
            SolveStatus::Inconsistent => {
                warn!("solve: normal equations for column {} are inconsistent", index);
                Err(LinalgError::SolverExhausted { column: index })
            }
        }
    }
}

/// Solves `A · X = Y` without a thread pool.
///
/// See [`LinearSolver::solve`].
pub fn solve(a: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>) -> Result<Matrix, LinalgError> {
    LinearSolver::new().solve(a, y)
}

#[cfg(test)]
#[path = "solver_test.rs"]
mod tests;

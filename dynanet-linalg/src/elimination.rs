// src/elimination.rs

use crate::error::LinalgError;
use crate::matrix::{is_zero, pivot_positions, Column, Matrix};
use crate::row_ops::{swap_nonzero, RowOp};
use log::trace;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::collections::HashSet;

/// A group of row operations that write pairwise distinct rows.
///
/// Operations inside a stage may run in any order, or concurrently; stage `N + 1`
/// must observe every write of stage `N`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stage {
    ops: Vec<RowOp>,
}

impl Stage {
    pub fn new() -> Self {
        Stage { ops: Vec::new() }
    }

    /// A stage holding exactly one operation.
    pub fn single(op: RowOp) -> Self {
        Stage { ops: vec![op] }
    }

    pub fn push(&mut self, op: RowOp) {
        debug_assert!(
            op.written_rows()
                .iter()
                .all(|row| !self.ops.iter().any(|o| o.written_rows().contains(row))),
            "two operations of one stage write the same row"
        );
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[RowOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Checks that no two operations write the same row.
    pub fn has_disjoint_writes(&self) -> bool {
        let mut seen = HashSet::new();
        self.ops
            .iter()
            .flat_map(|op| op.written_rows())
            .all(|row| seen.insert(row))
    }
}

/// The ordered record of every stage applied while reducing a matrix.
///
/// The log remembers the row count of the matrix it was derived from; it can be
/// replayed with [`execute`] on any matrix with that many rows.
#[derive(Debug, Clone, PartialEq)]
pub struct EliminationLog {
    rows: usize,
    stages: Vec<Stage>,
}

impl EliminationLog {
    pub fn new(rows: usize) -> Self {
        EliminationLog {
            rows,
            stages: Vec::new(),
        }
    }

    /// Row count of the matrix this log applies to.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Total number of row operations across all stages.
    pub fn op_count(&self) -> usize {
        self.stages.iter().map(Stage::len).sum()
    }

    fn push(&mut self, stage: Stage) {
        if !stage.is_empty() {
            self.stages.push(stage);
        }
    }
}

/// Reduces `matrix` to reduced row-echelon form in place.
///
/// Equivalent to [`eliminate_with`] without a thread pool.
pub fn eliminate(matrix: &mut Matrix) -> EliminationLog {
    eliminate_with(matrix, None)
}

/// Reduces `matrix` to reduced row-echelon form in place and returns the stage log.
///
/// # Arguments
/// * `matrix`: The matrix to reduce. On return it holds its RREF, with eliminated
///   entries written as exact zeros and pivots as exact ones.
/// * `pool`: Optional thread pool. Stages with more than one operation are evaluated
///   on the pool; without one every stage is applied in-line.
///
/// # Returns
/// The [`EliminationLog`] that transforms the original matrix into its RREF.
pub fn eliminate_with(matrix: &mut Matrix, pool: Option<&ThreadPool>) -> EliminationLog {
    let mut log = EliminationLog::new(matrix.nrows());
    forward_eliminate(matrix, &mut log, pool);
    backward_eliminate(matrix, &mut log, pool);
    trace!(
        "eliminate: {}x{} matrix reduced in {} stages ({} ops)",
        matrix.nrows(),
        matrix.ncols(),
        log.len(),
        log.op_count()
    );
    log
}

fn forward_eliminate(matrix: &mut Matrix, log: &mut EliminationLog, pool: Option<&ThreadPool>) {
    let rows = matrix.nrows();
    let mut pivot_row = 0;

    // Columns are visited until every row holds a pivot.
    for col in 0..matrix.ncols() {
        if pivot_row >= rows {
            break;
        }
        if is_zero(matrix[[pivot_row, col]]) {
            match swap_nonzero(matrix, pivot_row, col) {
                Some(swap) => log.push(Stage::single(swap)),
                None => {
                    // No pivot in this column; only the column index advances.
                    zero_column_from(matrix, pivot_row, col);
                    continue;
                }
            }
        }

        let pivot_value = matrix[[pivot_row, col]];
        let mut stage = Stage::new();
        for row in pivot_row + 1..rows {
            let value = matrix[[row, col]];
            if is_zero(value) {
                continue;
            }
            stage.push(RowOp::ScaleSubtract {
                source: pivot_row,
                target: row,
                scale: value / pivot_value,
            });
        }
        apply_stage(&stage, matrix, pool);
        zero_column_from(matrix, pivot_row + 1, col);
        log.push(stage);
        pivot_row += 1;
    }
}

fn backward_eliminate(matrix: &mut Matrix, log: &mut EliminationLog, pool: Option<&ThreadPool>) {
    let pivots = pivot_positions(matrix);
    let mut scale_stage = Stage::new();

    for pivot in pivots.iter().rev() {
        let pivot_value = matrix[[pivot.row, pivot.col]];
        if pivot_value != 1.0 {
            scale_stage.push(RowOp::Scale {
                row: pivot.row,
                factor: 1.0 / pivot_value,
            });
        }

        let mut stage = Stage::new();
        for row in (0..pivot.row).rev() {
            let value = matrix[[row, pivot.col]];
            if is_zero(value) {
                continue;
            }
            stage.push(RowOp::ScaleSubtract {
                source: pivot.row,
                target: row,
                scale: value / pivot_value,
            });
        }
        apply_stage(&stage, matrix, pool);
        for row in 0..pivot.row {
            matrix[[row, pivot.col]] = 0.0;
        }
        log.push(stage);
    }

    apply_stage(&scale_stage, matrix, pool);
    for pivot in &pivots {
        matrix[[pivot.row, pivot.col]] = 1.0;
    }
    log.push(scale_stage);
}

fn zero_column_from(matrix: &mut Matrix, start_row: usize, col: usize) {
    for row in start_row..matrix.nrows() {
        matrix[[row, col]] = 0.0;
    }
}

/// Replays every stage of `log`, in order, against `matrix`.
///
/// Used to bring a right-hand side into the frame of a reduced matrix without
/// re-deriving its pivots.
///
/// # Errors
/// `LinalgError::ShapeMismatch` if `matrix` does not have `log.rows()` rows.
pub fn execute(
    log: &EliminationLog,
    matrix: &mut Matrix,
    pool: Option<&ThreadPool>,
) -> Result<(), LinalgError> {
    if matrix.nrows() != log.rows() {
        return Err(LinalgError::ShapeMismatch {
            expected: vec![log.rows()],
            actual: vec![matrix.nrows()],
            operation: "execute elimination log".to_string(),
        });
    }
    for stage in log.stages() {
        apply_stage(stage, matrix, pool);
    }
    Ok(())
}

fn apply_stage(stage: &Stage, matrix: &mut Matrix, pool: Option<&ThreadPool>) {
    match pool {
        Some(pool) if stage.len() > 1 => {
            let snapshot: &Matrix = &*matrix;
            let updates: Vec<Vec<(usize, Column)>> = pool.install(|| {
                stage
                    .ops()
                    .par_iter()
                    .map(|op| op.evaluate(snapshot))
                    .collect()
            });
            for (row, values) in updates.into_iter().flatten() {
                matrix.row_mut(row).assign(&values);
            }
        }
        _ => {
            for op in stage.ops() {
                op.apply(matrix);
            }
        }
    }
}

#[cfg(test)]
#[path = "elimination_test.rs"]
mod tests;

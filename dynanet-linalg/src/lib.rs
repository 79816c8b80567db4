//! Staged Gauss-Jordan elimination and linear system solving.
//!
//! Elimination records every elementary row operation into an [`EliminationLog`]
//! grouped in stages whose operations write disjoint rows, so a stage can be
//! applied concurrently and the whole log can be replayed on another matrix with
//! the same row count.

pub mod elimination;
pub mod error;
pub mod matrix;
pub mod row_ops;
pub mod solution;
pub mod solver;
pub mod utils;

pub use elimination::{eliminate, eliminate_with, execute, EliminationLog, Stage};
pub use error::LinalgError;
pub use matrix::{pivot_positions, Column, Matrix, PivotPosition, ZERO_TOLERANCE};
pub use row_ops::RowOp;
pub use solution::SolutionDescriptor;
pub use solver::{classify, solve, ColumnOutcome, LinearSolver, SolveReport, SolveStatus};

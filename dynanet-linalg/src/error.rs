use thiserror::Error;

/// Custom error type for the elimination engine and the linear system solver.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum LinalgError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    /// The normal equations built for an inconsistent column were themselves inconsistent.
    /// A well-formed real system cannot reach this state.
    #[error("Normal equations for column {column} are inconsistent, no least-squares solution was found")]
    SolverExhausted { column: usize },
}

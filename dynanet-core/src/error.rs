use crate::graph::{ConnectionId, NodeId, NodeKind};
use dynanet_linalg::LinalgError;
use thiserror::Error;

/// Custom error type for the DynaNet graph, its traversals and the network facade.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum DynaNetError {
    #[error("Shape mismatch at node {node}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        node: NodeId,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// A node was asked to produce data before any message reached it.
    #[error("Node {node} has no data ready")]
    NoDataReady { node: NodeId },

    /// A node was visited by backpropagation without a pending error message.
    #[error("Node {node} has no error message ready")]
    NoErrorReady { node: NodeId },

    #[error("Malformed message history: {0}")]
    MalformedHistory(String),

    #[error("Normal equations for column {column} are inconsistent, no least-squares solution was found")]
    SolverExhausted { column: usize },

    #[error("Incorrect number of inputs: expected {expected}, got {actual}")]
    InputCountMismatch { expected: usize, actual: usize },

    #[error("Incorrect number of expected outputs: expected {expected}, got {actual}")]
    OutputCountMismatch { expected: usize, actual: usize },

    #[error("Node {node} is a {actual:?} node, operation requires a {expected:?} node")]
    UnexpectedNodeKind {
        node: NodeId,
        expected: NodeKind,
        actual: NodeKind,
    },

    #[error("Unknown node {0}")]
    UnknownNode(NodeId),

    #[error("Unknown connection {0}")]
    UnknownConnection(ConnectionId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Linear algebra error: {0}")]
    Linalg(LinalgError),
}

impl From<LinalgError> for DynaNetError {
    fn from(err: LinalgError) -> Self {
        match err {
            LinalgError::SolverExhausted { column } => DynaNetError::SolverExhausted { column },
            other => DynaNetError::Linalg(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_exhausted_is_lifted() {
        let err: DynaNetError = LinalgError::SolverExhausted { column: 3 }.into();
        assert_eq!(err, DynaNetError::SolverExhausted { column: 3 });
    }

    #[test]
    fn test_shape_mismatch_is_wrapped() {
        let inner = LinalgError::ShapeMismatch {
            expected: vec![2, 2],
            actual: vec![3, 2],
            operation: "solve".to_string(),
        };
        let err: DynaNetError = inner.clone().into();
        assert_eq!(err, DynaNetError::Linalg(inner));
    }

    #[test]
    fn test_display() {
        let err = DynaNetError::NoDataReady { node: NodeId(4) };
        assert_eq!(err.to_string(), "Node node#4 has no data ready");
    }
}

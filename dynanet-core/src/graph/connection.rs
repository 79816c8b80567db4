use super::ids::{ConnectionId, NodeId};
use super::node::NodeKind;
use crate::error::DynaNetError;
use crate::message::{Message, TransitRecord};
use dynanet_linalg::matrix::matmul;
use dynanet_linalg::{LinalgError, LinearSolver, Matrix};
use log::trace;

/// Directed edge `node_in → node_out` transforming `X` into `weight_a · X · weight_b`.
///
/// `weight_a` has shape `(node_out.rows, node_in.rows)` and `weight_b` has shape
/// `(node_in.cols, node_out.cols)`. The deltas have the same shapes as their
/// weights and collect corrections until [`Connection::apply_deltas`] is called.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    node_in: NodeId,
    node_out: NodeId,
    weight_a: Matrix,
    weight_b: Matrix,
    delta_a: Matrix,
    delta_b: Matrix,
}

impl Connection {
    pub(crate) fn new(
        id: ConnectionId,
        node_in: NodeId,
        node_out: NodeId,
        weight_a: Matrix,
        weight_b: Matrix,
    ) -> Self {
        let delta_a = Matrix::zeros(weight_a.dim());
        let delta_b = Matrix::zeros(weight_b.dim());
        Connection {
            id,
            node_in,
            node_out,
            weight_a,
            weight_b,
            delta_a,
            delta_b,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn node_in(&self) -> NodeId {
        self.node_in
    }

    pub fn node_out(&self) -> NodeId {
        self.node_out
    }

    pub fn weight_a(&self) -> &Matrix {
        &self.weight_a
    }

    pub fn weight_b(&self) -> &Matrix {
        &self.weight_b
    }

    pub fn delta_a(&self) -> &Matrix {
        &self.delta_a
    }

    pub fn delta_b(&self) -> &Matrix {
        &self.delta_b
    }

    /// Replaces both weight factors.
    ///
    /// # Errors
    /// `DynaNetError::Linalg` with a shape mismatch if either factor does not have the
    /// shape of the one it replaces.
    pub fn set_weights(&mut self, weight_a: Matrix, weight_b: Matrix) -> Result<(), DynaNetError> {
        for (current, replacement) in [(&self.weight_a, &weight_a), (&self.weight_b, &weight_b)] {
            if current.dim() != replacement.dim() {
                return Err(LinalgError::ShapeMismatch {
                    expected: current.shape().to_vec(),
                    actual: replacement.shape().to_vec(),
                    operation: format!("set weights of {}", self.id),
                }
                .into());
            }
        }
        self.weight_a = weight_a;
        self.weight_b = weight_b;
        Ok(())
    }

    /// Sends `message` across the edge.
    ///
    /// The returned message carries a copy of the input history extended with this
    /// edge's transit record.
    pub fn transmit(&self, message: &Message) -> Result<Message, DynaNetError> {
        let input = message.content();
        let intermediate = matmul(self.weight_a.view(), input.view(), "transmit")?;
        let output = matmul(intermediate.view(), self.weight_b.view(), "transmit")?;

        let mut history = message.history().clone();
        history.push_transit(TransitRecord {
            connection: self.id,
            input: input.clone(),
            intermediate,
        });
        Ok(Message::with_history(output, history))
    }

    /// Reverses one crossing of this edge for the error `error` observed at `node_out`.
    ///
    /// `split_ratio` of the error is absorbed by `weight_b`. Of the remainder, pushed
    /// back through `weight_b` onto the intermediate product, a further `split_ratio`
    /// share is absorbed by `weight_a` and the rest is pushed back through `weight_a`
    /// onto the input. An Input source absorbs nothing, so `weight_a` takes the whole
    /// remainder.
    ///
    /// # Arguments
    /// * `error`: Error at `node_out`, shaped like `node_out`.
    /// * `record`: The transit record this edge wrote on the way forward.
    /// * `source_kind`: Kind of `node_in`.
    /// * `split_ratio`: Share of the error assigned to the weight factors.
    /// * `solver`: Solver used for every linear system.
    ///
    /// # Returns
    /// The error to deliver to `node_in`, or `None` when `node_in` is an Input node.
    pub fn transmit_error(
        &mut self,
        error: &Matrix,
        record: &TransitRecord,
        source_kind: NodeKind,
        split_ratio: f64,
        solver: &LinearSolver<'_>,
    ) -> Result<Option<Matrix>, DynaNetError> {
        let err_b = error * split_ratio;
        let err_intermediate = error - &err_b;

        let d_weight_b = solver.solve(record.intermediate.view(), err_b.view())?;
        let d_intermediate = solver
            .solve(self.weight_b.t(), err_intermediate.t())?
            .reversed_axes();

        let (err_a, err_input) = if source_kind == NodeKind::Input {
            (d_intermediate, None)
        } else {
            let err_a = &d_intermediate * split_ratio;
            let err_input = &d_intermediate - &err_a;
            (err_a, Some(err_input))
        };

        let d_weight_a = solver.solve(record.input.t(), err_a.t())?.reversed_axes();
        let d_input = match err_input {
            Some(err_input) => Some(solver.solve(self.weight_a.view(), err_input.view())?),
            None => None,
        };

        self.delta_a += &d_weight_a;
        self.delta_b += &d_weight_b;
        trace!("{}: error transmitted (source kind {:?})", self.id, source_kind);
        Ok(d_input)
    }

    /// Adds the pending deltas to the weights and resets them to zero.
    pub fn apply_deltas(&mut self) {
        self.weight_a += &self.delta_a;
        self.weight_b += &self.delta_b;
        self.delta_a.fill(0.0);
        self.delta_b.fill(0.0);
    }
}

#[cfg(test)]
#[path = "connection_test.rs"]
mod tests;

use crate::error::DynaNetError;
use crate::graph::{ConnectionId, Graph, NodeId};
use dynanet_linalg::Matrix;

pub use dynanet_linalg::utils::testing::{check_matrix_near, matrix_near};

/// Connects `node_in` to `node_out` and installs the given weight factors.
///
/// Works whether or not the edge existed before.
pub fn connect_fixed(
    graph: &mut Graph,
    node_in: NodeId,
    node_out: NodeId,
    weight_a: Matrix,
    weight_b: Matrix,
) -> Result<ConnectionId, DynaNetError> {
    graph.connect(node_in, node_out)?;
    let id = graph
        .find_connection(node_in, node_out)
        .ok_or(DynaNetError::UnknownNode(node_out))?;
    graph.connection_mut(id)?.set_weights(weight_a, weight_b)?;
    Ok(id)
}

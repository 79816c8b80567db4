//! Arena-backed node and connection storage.
//!
//! The graph owns every [`Node`] and [`Connection`]; both refer to each other only
//! through [`NodeId`] and [`ConnectionId`] indices. Traversal logic lives in the
//! propagation, backpropagation and sweep modules.

pub mod connection;
pub mod ids;
pub mod node;

pub use connection::Connection;
pub use ids::{ConnectionId, NodeId};
pub use node::{Node, NodeKind};

use crate::config::WeightInit;
use crate::error::DynaNetError;
use dynanet_linalg::Matrix;
use log::trace;
use rand::Rng;

#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    connections: Vec<Connection>,
}

impl Graph {
    pub fn new() -> Self {
        Graph::default()
    }

    pub fn add_node(&mut self, kind: NodeKind, shape: (usize, usize)) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(id, kind, shape));
        id
    }

    pub fn add_input_node(&mut self, shape: (usize, usize)) -> NodeId {
        self.add_node(NodeKind::Input, shape)
    }

    pub fn add_internal_node(&mut self, shape: (usize, usize)) -> NodeId {
        self.add_node(NodeKind::Internal, shape)
    }

    pub fn add_output_node(&mut self, shape: (usize, usize)) -> NodeId {
        self.add_node(NodeKind::Output, shape)
    }

    /// Connects `node_in` to `node_out` with weights drawn from the default
    /// [`WeightInit`].
    ///
    /// See [`Graph::connect_with`].
    pub fn connect(&mut self, node_in: NodeId, node_out: NodeId) -> Result<bool, DynaNetError> {
        let mut rng = rand::thread_rng();
        self.connect_with(node_in, node_out, &WeightInit::default(), &mut rng)
    }

    /// Connects `node_in` to `node_out` unless that edge already exists.
    ///
    /// # Arguments
    /// * `init`: Distribution of the fresh `weight_a` and `weight_b` entries.
    /// * `rng`: Random source for the weights.
    ///
    /// # Returns
    /// `true` if a connection was added, `false` if the edge was already present.
    ///
    /// # Errors
    /// * `DynaNetError::UnknownNode` if either id is not part of this graph.
    /// * `DynaNetError::InvalidConfig` if `init` is not a valid distribution.
    pub fn connect_with<R: Rng + ?Sized>(
        &mut self,
        node_in: NodeId,
        node_out: NodeId,
        init: &WeightInit,
        rng: &mut R,
    ) -> Result<bool, DynaNetError> {
        let (in_rows, in_cols) = self.node(node_in)?.shape();
        let (out_rows, out_cols) = self.node(node_out)?.shape();
        if self.find_connection(node_in, node_out).is_some() {
            return Ok(false);
        }

        let weight_a = init.sample_matrix((out_rows, in_rows), rng)?;
        let weight_b = init.sample_matrix((in_cols, out_cols), rng)?;
        let id = ConnectionId(self.connections.len());
        self.connections
            .push(Connection::new(id, node_in, node_out, weight_a, weight_b));
        self.node_mut(node_in)?.add_outgoing(id);
        self.node_mut(node_out)?.add_incoming(id);
        trace!("Graph: {} connects {} to {}", id, node_in, node_out);
        Ok(true)
    }

    /// The connection from `node_in` to `node_out`, if there is one.
    pub fn find_connection(&self, node_in: NodeId, node_out: NodeId) -> Option<ConnectionId> {
        let node = self.nodes.get(node_in.index())?;
        node.outgoing()
            .iter()
            .copied()
            .find(|id| self.connections[id.index()].node_out() == node_out)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, DynaNetError> {
        self.nodes.get(id.index()).ok_or(DynaNetError::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DynaNetError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(DynaNetError::UnknownNode(id))
    }

    pub fn connection(&self, id: ConnectionId) -> Result<&Connection, DynaNetError> {
        self.connections
            .get(id.index())
            .ok_or(DynaNetError::UnknownConnection(id))
    }

    pub fn connection_mut(&mut self, id: ConnectionId) -> Result<&mut Connection, DynaNetError> {
        self.connections
            .get_mut(id.index())
            .ok_or(DynaNetError::UnknownConnection(id))
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Input nodes in creation order.
    pub fn input_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes_of_kind(NodeKind::Input)
    }

    /// Output nodes in creation order.
    pub fn output_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes_of_kind(NodeKind::Output)
    }

    fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(move |node| node.kind() == kind)
            .map(Node::id)
    }

    fn expect_kind(&self, id: NodeId, expected: NodeKind) -> Result<(), DynaNetError> {
        let actual = self.node(id)?.kind();
        if actual != expected {
            return Err(DynaNetError::UnexpectedNodeKind {
                node: id,
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Places `content` in the outbound buffer of an Input node.
    ///
    /// # Errors
    /// * `DynaNetError::UnexpectedNodeKind` if `node` is not an Input node.
    /// * `DynaNetError::ShapeMismatch` if `content` does not have the node's shape.
    pub fn deposit(&mut self, node: NodeId, content: Matrix) -> Result<(), DynaNetError> {
        self.expect_kind(node, NodeKind::Input)?;
        self.node_mut(node)?.deposit(content)
    }

    /// Combines the pending messages of an Output node, if needed, and returns the result.
    ///
    /// # Errors
    /// * `DynaNetError::UnexpectedNodeKind` if `node` is not an Output node.
    /// * `DynaNetError::NoDataReady` if no message has reached the node.
    pub fn read(&mut self, node: NodeId) -> Result<&Matrix, DynaNetError> {
        self.expect_kind(node, NodeKind::Output)?;
        Ok(self.node_mut(node)?.ensure_outgoing()?.content())
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;

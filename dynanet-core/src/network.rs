use crate::backprop::{backpropagate, seed_error};
use crate::config::NetworkConfig;
use crate::error::DynaNetError;
use crate::graph::{Graph, NodeId, NodeKind};
use crate::propagation::propagate;
use crate::sweep::clear_messages;
use crate::update::update_weights;
use dynanet_linalg::{LinearSolver, Matrix};
use log::debug;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// A graph together with its ordered inputs and outputs, its settings and the
/// thread pool used by its linear solves.
///
/// Input data, expected outputs and returned outputs are matched to nodes by
/// creation order.
#[derive(Debug)]
pub struct Network {
    graph: Graph,
    config: NetworkConfig,
    input_nodes: Vec<NodeId>,
    output_nodes: Vec<NodeId>,
    // Inputs deposited since the last propagation.
    pending_inputs: Vec<NodeId>,
    pool: Option<ThreadPool>,
}

impl Default for Network {
    fn default() -> Self {
        Network::from_parts(NetworkConfig::default(), None)
    }
}

impl Network {
    /// Creates an empty network.
    ///
    /// # Errors
    /// `DynaNetError::InvalidConfig` if `config` fails validation or the elimination
    /// thread pool cannot be built.
    pub fn new(config: NetworkConfig) -> Result<Self, DynaNetError> {
        config.validate()?;
        let pool = match config.elimination_threads {
            Some(threads) => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| DynaNetError::InvalidConfig(e.to_string()))?;
                debug!("Network: elimination pool with {} threads", threads);
                Some(pool)
            }
            None => None,
        };
        Ok(Network::from_parts(config, pool))
    }

    fn from_parts(config: NetworkConfig, pool: Option<ThreadPool>) -> Self {
        Network {
            graph: Graph::new(),
            config,
            input_nodes: Vec::new(),
            output_nodes: Vec::new(),
            pending_inputs: Vec::new(),
            pool,
        }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn input_nodes(&self) -> &[NodeId] {
        &self.input_nodes
    }

    pub fn output_nodes(&self) -> &[NodeId] {
        &self.output_nodes
    }

    /// A solver borrowing this network's elimination pool, if it has one.
    pub fn solver(&self) -> LinearSolver<'_> {
        solver_for(self.pool.as_ref())
    }

    pub fn add_input_node(&mut self, shape: (usize, usize)) -> NodeId {
        let id = self.graph.add_node(NodeKind::Input, shape);
        self.input_nodes.push(id);
        id
    }

    pub fn add_internal_node(&mut self, shape: (usize, usize)) -> NodeId {
        self.graph.add_node(NodeKind::Internal, shape)
    }

    pub fn add_output_node(&mut self, shape: (usize, usize)) -> NodeId {
        let id = self.graph.add_node(NodeKind::Output, shape);
        self.output_nodes.push(id);
        id
    }

    /// Connects two nodes with weights drawn from the configured distribution.
    ///
    /// Returns `false` if the edge already exists.
    pub fn connect(&mut self, node_in: NodeId, node_out: NodeId) -> Result<bool, DynaNetError> {
        let mut rng = rand::thread_rng();
        self.graph
            .connect_with(node_in, node_out, &self.config.weight_init, &mut rng)
    }

    /// Deposits one matrix per Input node, in creation order.
    ///
    /// On any error every input deposited by this call is withdrawn again.
    ///
    /// # Errors
    /// * `DynaNetError::InputCountMismatch` if `inputs` has the wrong length.
    /// * `DynaNetError::ShapeMismatch` if a matrix does not fit its node.
    pub fn add_input_data(&mut self, inputs: Vec<Matrix>) -> Result<(), DynaNetError> {
        if inputs.len() != self.input_nodes.len() {
            return Err(DynaNetError::InputCountMismatch {
                expected: self.input_nodes.len(),
                actual: inputs.len(),
            });
        }
        for (&node, data) in self.input_nodes.iter().zip(inputs) {
            if let Err(err) = self.graph.deposit(node, data) {
                for &pending in &self.pending_inputs {
                    self.graph.node_mut(pending)?.clear();
                }
                self.pending_inputs.clear();
                return Err(err);
            }
            self.pending_inputs.push(node);
        }
        Ok(())
    }

    /// Propagates the deposited inputs through the graph.
    pub fn propagate_inputs(&mut self) -> Result<(), DynaNetError> {
        let frontier = std::mem::take(&mut self.pending_inputs);
        propagate(&mut self.graph, &frontier)
    }

    /// Reads every Output node, in creation order.
    ///
    /// # Errors
    /// `DynaNetError::NoDataReady` if an Output node has not been reached.
    pub fn extract_output_data(&mut self) -> Result<Vec<Matrix>, DynaNetError> {
        let mut outputs = Vec::with_capacity(self.output_nodes.len());
        for &node in &self.output_nodes {
            outputs.push(self.graph.read(node)?.clone());
        }
        Ok(outputs)
    }

    /// Empties every message buffer reachable from the Input nodes.
    pub fn clear_messages(&mut self) -> Result<(), DynaNetError> {
        self.pending_inputs.clear();
        clear_messages(&mut self.graph)
    }

    /// Runs `inputs` through the network and returns the outputs.
    ///
    /// The graph's buffers are cleared afterwards, whether or not the pass succeeded.
    pub fn forward(&mut self, inputs: Vec<Matrix>) -> Result<Vec<Matrix>, DynaNetError> {
        self.add_input_data(inputs)?;
        let outputs = self
            .propagate_inputs()
            .and_then(|_| self.extract_output_data());
        self.clear_messages()?;
        outputs
    }

    /// Runs `inputs` forward and backpropagates `expected - actual` from every output.
    ///
    /// Corrections accumulate in the connection deltas across calls until
    /// [`Network::update_weights`] applies them.
    ///
    /// # Errors
    /// * `DynaNetError::OutputCountMismatch` if `expected` has the wrong length.
    /// * Any error of the forward pass or of backpropagation.
    pub fn accumulate_error(&mut self, inputs: Vec<Matrix>, expected: &[Matrix]) -> Result<(), DynaNetError> {
        if expected.len() != self.output_nodes.len() {
            return Err(DynaNetError::OutputCountMismatch {
                expected: self.output_nodes.len(),
                actual: expected.len(),
            });
        }
        self.add_input_data(inputs)?;
        let result = self.backpropagate_pending(expected);
        self.clear_messages()?;
        result
    }

    fn backpropagate_pending(&mut self, expected: &[Matrix]) -> Result<(), DynaNetError> {
        self.propagate_inputs()?;
        let mut seeds = Vec::with_capacity(expected.len());
        for (&node, target) in self.output_nodes.iter().zip(expected) {
            seeds.push((node, seed_error(&mut self.graph, node, target)?));
        }
        clear_messages(&mut self.graph)?;

        let solver = solver_for(self.pool.as_ref());
        backpropagate(&mut self.graph, seeds, self.config.split_ratio, &solver)
    }

    /// Applies the accumulated deltas to the weights.
    pub fn update_weights(&mut self) -> Result<(), DynaNetError> {
        update_weights(&mut self.graph)
    }

    /// One training step: [`Network::accumulate_error`] followed by
    /// [`Network::update_weights`].
    pub fn perform_backpropagation(
        &mut self,
        inputs: Vec<Matrix>,
        expected: &[Matrix],
    ) -> Result<(), DynaNetError> {
        self.accumulate_error(inputs, expected)?;
        self.update_weights()
    }
}

fn solver_for(pool: Option<&ThreadPool>) -> LinearSolver<'_> {
    match pool {
        Some(pool) => LinearSolver::with_pool(pool),
        None => LinearSolver::new(),
    }
}

#[cfg(test)]
#[path = "network_test.rs"]
mod tests;

use dynanet_core::{Matrix, Network, NodeId, WeightInit};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::Rng;

// Random matrix with entries in [-1, 1).
#[allow(dead_code)]
pub(crate) fn random_matrix(rng: &mut StdRng, shape: (usize, usize)) -> Matrix {
    Array2::from_shape_simple_fn(shape, || rng.gen_range(-1.0..1.0))
}

// Builds input -> internal... -> output with one node per shape, weights drawn from `rng`.
// Returns the input and output node ids.
#[allow(dead_code)]
pub(crate) fn build_chain(
    network: &mut Network,
    shapes: &[(usize, usize)],
    rng: &mut StdRng,
) -> (NodeId, NodeId) {
    assert!(shapes.len() >= 2, "a chain needs at least an input and an output");
    let input = network.add_input_node(shapes[0]);
    let mut previous = input;
    for (i, &shape) in shapes.iter().enumerate().skip(1) {
        let node = if i == shapes.len() - 1 {
            network.add_output_node(shape)
        } else {
            network.add_internal_node(shape)
        };
        network
            .graph_mut()
            .connect_with(previous, node, &WeightInit::default(), rng)
            .expect("Failed to connect chain nodes");
        previous = node;
    }
    (input, previous)
}

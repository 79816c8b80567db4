use dynanet_linalg::Matrix;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::Rng;

// Random matrix with entries in [-1, 1).
#[allow(dead_code)]
pub(crate) fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize) -> Matrix {
    Array2::from_shape_simple_fn((rows, cols), || rng.gen_range(-1.0..1.0))
}

// Square matrix made diagonally dominant so it is always invertible and well conditioned.
#[allow(dead_code)]
pub(crate) fn well_conditioned_square(rng: &mut StdRng, size: usize) -> Matrix {
    let mut m = random_matrix(rng, size, size);
    for i in 0..size {
        m[[i, i]] += size as f64 + 1.0;
    }
    m
}

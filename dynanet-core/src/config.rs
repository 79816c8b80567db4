use crate::error::DynaNetError;
use dynanet_linalg::Matrix;
use ndarray::Array2;
use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

/// Share of an edge's error assigned to `weight_b` (and, for non-leaf edges, of
/// the remainder assigned to `weight_a`).
pub const DEFAULT_SPLIT_RATIO: f64 = 0.5;

/// Distribution used to draw the entries of fresh weight factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeightInit {
    /// Uniform in `[low, high)`.
    Uniform { low: f64, high: f64 },
    /// Gaussian with the given mean and standard deviation.
    Normal { mean: f64, std_dev: f64 },
}

impl Default for WeightInit {
    fn default() -> Self {
        WeightInit::Uniform {
            low: -1.0,
            high: 1.0,
        }
    }
}

impl WeightInit {
    /// # Errors
    /// `DynaNetError::InvalidConfig` for an empty or non-finite range, or a
    /// non-positive or non-finite standard deviation.
    pub fn validate(&self) -> Result<(), DynaNetError> {
        match *self {
            WeightInit::Uniform { low, high } => {
                if !low.is_finite() || !high.is_finite() || low >= high {
                    return Err(DynaNetError::InvalidConfig(format!(
                        "uniform weight range [{}, {}) is empty or not finite",
                        low, high
                    )));
                }
            }
            WeightInit::Normal { mean, std_dev } => {
                if !mean.is_finite() || !std_dev.is_finite() || std_dev <= 0.0 {
                    return Err(DynaNetError::InvalidConfig(format!(
                        "normal weight distribution needs a finite mean and a positive standard deviation, got mean={} std_dev={}",
                        mean, std_dev
                    )));
                }
            }
        }
        Ok(())
    }

    /// Draws a `shape` matrix from this distribution.
    pub fn sample_matrix<R: Rng + ?Sized>(
        &self,
        shape: (usize, usize),
        rng: &mut R,
    ) -> Result<Matrix, DynaNetError> {
        self.validate()?;
        let matrix = match *self {
            WeightInit::Uniform { low, high } => {
                let dist = Uniform::new(low, high);
                Array2::from_shape_simple_fn(shape, || dist.sample(rng))
            }
            WeightInit::Normal { mean, std_dev } => {
                let dist = Normal::new(mean, std_dev)
                    .map_err(|e| DynaNetError::InvalidConfig(e.to_string()))?;
                Array2::from_shape_simple_fn(shape, || dist.sample(rng))
            }
        };
        Ok(matrix)
    }
}

/// Settings of a [`Network`](crate::network::Network).
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfig {
    pub split_ratio: f64,
    pub weight_init: WeightInit,
    /// When set, elimination stages run on a dedicated pool with this many threads.
    pub elimination_threads: Option<usize>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            split_ratio: DEFAULT_SPLIT_RATIO,
            weight_init: WeightInit::default(),
            elimination_threads: None,
        }
    }
}

impl NetworkConfig {
    pub fn with_split_ratio(mut self, split_ratio: f64) -> Self {
        self.split_ratio = split_ratio;
        self
    }

    pub fn with_weight_init(mut self, weight_init: WeightInit) -> Self {
        self.weight_init = weight_init;
        self
    }

    pub fn with_elimination_threads(mut self, threads: usize) -> Self {
        self.elimination_threads = Some(threads);
        self
    }

    /// # Errors
    /// `DynaNetError::InvalidConfig` if `split_ratio` is outside `[0, 1]`, the weight
    /// distribution is invalid, or zero elimination threads are requested.
    pub fn validate(&self) -> Result<(), DynaNetError> {
        if !(0.0..=1.0).contains(&self.split_ratio) {
            return Err(DynaNetError::InvalidConfig(format!(
                "split_ratio must lie in [0, 1], got {}",
                self.split_ratio
            )));
        }
        self.weight_init.validate()?;
        if self.elimination_threads == Some(0) {
            return Err(DynaNetError::InvalidConfig(
                "elimination_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

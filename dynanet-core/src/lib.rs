//! A trainable computation graph whose nodes hold matrices and whose edges apply
//! a two-sided matrix product.
//!
//! Errors are corrected by solving the linear system each edge implies, via
//! [`dynanet_linalg`], rather than by differentiating it.

pub mod backprop;
pub mod config;
pub mod error;
pub mod graph;
pub mod message;
pub mod network;
pub mod propagation;
pub mod sweep;
pub mod update;
pub mod utils;
mod worklist;

pub use config::{NetworkConfig, WeightInit, DEFAULT_SPLIT_RATIO};
pub use error::DynaNetError;
pub use graph::{Connection, ConnectionId, Graph, Node, NodeId, NodeKind};
pub use message::{History, HistoryEntry, Message, TransitRecord};
pub use network::Network;

// Re-export the linear algebra crate so callers share its matrix type.
pub use dynanet_linalg;
pub use dynanet_linalg::Matrix;

//! Synapse - a concurrent propagation engine for feed-forward neural networks.
//!
//! The network is a directed acyclic dataflow graph of scalar signals. Both
//! inference (forward) and gradient propagation (backward) run through the
//! same engine: fixed pools of workers aggregate in-flight signals per node
//! and fire each node exactly once, with the two passes differing only in
//! which edge direction a node converges on and which it fans out along.

// Core infrastructure modules
pub mod core {
    pub mod config;
    pub mod errors;
}

pub mod compute; // Per-node compute capabilities (neuron, weight, cost)
pub mod engine; // The pass scheduler and its worker pools
pub mod graph; // Graph store, node units, layered construction
pub mod train; // In-memory epoch/shuffle training loop

// Re-exports for convenience
pub use crate::core::config::EngineConfig;
pub use crate::core::errors::{Result, SynapseError};

pub use compute::{sigmoid, Compute, Cost, Neuron, SignalMap, Weight};
pub use engine::{Direction, Signal};
pub use graph::{Network, NodeCell, NodeId, PassPhase};
pub use train::{Trainer, TrainingSample};

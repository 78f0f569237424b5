//! Per-node compute capabilities.
//!
//! Every node in the graph carries one of exactly three capabilities: a
//! neuron (bias plus logistic sigmoid), a multiplicative scalar weight, or
//! the terminal cost unit. The engine only ever invokes two operations on
//! them - `forward` during inference and `backward` during gradient
//! propagation - so dispatch is a closed enum rather than an open trait.

mod cost;
mod neuron;
mod weight;

pub use cost::Cost;
pub use neuron::Neuron;
pub use weight::Weight;

use std::collections::BTreeMap;

use crate::graph::NodeId;

/// Values received by a node during the current pass, keyed by the
/// originating neighbor. `None` is the synthetic origin used to seed a
/// pass. Ordered so that summation order, and therefore every float
/// result, is identical across repeated passes.
pub type SignalMap = BTreeMap<Option<NodeId>, f64>;

/// Logistic sigmoid, the saturating nonlinearity applied by neurons.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Gradient-descent update rule: step against the partial derivative.
pub(crate) fn learn(current: f64, rate: f64, partial: f64) -> f64 {
    current - rate * partial
}

/// Sum of every value received during the current pass.
pub(crate) fn signal_sum(signals: &SignalMap) -> f64 {
    signals.values().sum()
}

/// The compute capability attached to a node.
#[derive(Debug, Clone)]
pub enum Compute {
    /// Bias plus sigmoid activation
    Neuron(Neuron),
    /// Multiplicative scalar edge
    Weight(Weight),
    /// Terminal squared-error cost unit
    Cost(Cost),
}

impl Compute {
    /// Consumes the values aggregated during a forward pass and produces
    /// this node's output.
    pub fn forward(&mut self, inputs: &SignalMap) -> f64 {
        match self {
            Compute::Neuron(n) => n.forward(inputs),
            Compute::Weight(w) => w.forward(inputs),
            Compute::Cost(c) => c.forward(inputs),
        }
    }

    /// Consumes the aggregated upstream partial derivative, applies the
    /// local parameter update, and returns the partial to propagate along
    /// `edge`. `edge` is `None` only for seed-terminated nodes (the input
    /// layer), which update their parameters but propagate nothing.
    pub fn backward(&mut self, partial_sum: f64, rate: f64, edge: Option<NodeId>) -> f64 {
        match self {
            Compute::Neuron(n) => n.backward(partial_sum, rate),
            Compute::Weight(w) => w.backward(partial_sum, rate),
            Compute::Cost(c) => c.backward(edge),
        }
    }
}

//! Graph store and the network's external surface.
//!
//! The `Network` owns the node table and the output-value table. Node
//! lookup is read-mostly behind a reader/writer lock; per-node mutation is
//! locked at node granularity (see `node::NodeState`); the output table has
//! its own locking (a sharded concurrent map) so readers never contend with
//! a node's critical section.

pub mod builder;
pub mod node;

pub use node::{NodeCell, NodeId, PassPhase};

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;

use crate::compute::Compute;
use crate::core::config::EngineConfig;
use crate::core::errors::{Result, SynapseError};
use crate::engine;

/// A feed-forward network: the node table, per-node adjacency, and the
/// table of last-computed outputs. Built once, reused across many passes.
pub struct Network {
    nodes: RwLock<HashMap<NodeId, Arc<NodeCell>>>,
    outputs: DashMap<NodeId, f64>,
    input_count: usize,
    output_count: usize,
    output_start: NodeId,
    cost_id: NodeId,
    config: EngineConfig,
}

impl Network {
    /// Concurrency-safe node lookup. An unknown id is a construction bug,
    /// surfaced as an error rather than a panic.
    pub async fn node(&self, id: NodeId) -> Result<Arc<NodeCell>> {
        let nodes = self.nodes.read().await;
        nodes.get(&id).cloned().ok_or(SynapseError::UnknownNode { id })
    }

    /// Clears every node's pending values and resets its pass phase.
    /// Runs at the start of every pass, never with a pass in flight.
    pub async fn flush(&self) {
        let nodes = self.nodes.write().await;
        for cell in nodes.values() {
            let mut state = cell.state.lock().await;
            state.pending.clear();
            state.phase = PassPhase::Pending;
        }
    }

    pub fn input_count(&self) -> usize {
        self.input_count
    }

    pub fn output_count(&self) -> usize {
        self.output_count
    }

    /// Id of the terminal cost node.
    pub fn cost_node_id(&self) -> NodeId {
        self.cost_id
    }

    /// Id of the `idx`-th output neuron.
    pub fn output_node_id(&self, idx: usize) -> NodeId {
        self.output_start + idx
    }

    pub async fn node_count(&self) -> usize {
        self.nodes.read().await.len()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn record_output(&self, id: NodeId, value: f64) {
        self.outputs.insert(id, value);
    }

    /// The node's last computed forward value. Stale (or absent) before
    /// the first forward pass.
    pub fn output(&self, id: NodeId) -> Option<f64> {
        self.outputs.get(&id).map(|v| *v)
    }

    /// Output-layer activations in output order. Nodes that have not fired
    /// yet read as 0.0.
    pub fn outputs(&self) -> Vec<f64> {
        (0..self.output_count)
            .map(|i| self.output(self.output_node_id(i)).unwrap_or(0.0))
            .collect()
    }

    /// Total cost from the last forward pass.
    pub fn cost(&self) -> Option<f64> {
        self.output(self.cost_id)
    }

    /// Configures the cost terminal's target values, one per output node in
    /// output order.
    pub async fn set_targets(&self, targets: &[f64]) -> Result<()> {
        if targets.len() != self.output_count {
            return Err(SynapseError::input(format!(
                "expected {} target values, got {}",
                self.output_count,
                targets.len()
            )));
        }
        let cell = self.node(self.cost_id).await?;
        let mut state = cell.state.lock().await;
        match &mut state.compute {
            Compute::Cost(cost) => {
                let map: BTreeMap<NodeId, f64> = targets
                    .iter()
                    .enumerate()
                    .map(|(i, &t)| (self.output_start + i, t))
                    .collect();
                cost.set_targets(map);
                Ok(())
            }
            _ => Err(SynapseError::topology(format!(
                "node {} is not the cost terminal",
                self.cost_id
            ))),
        }
    }

    /// Current bias of a neuron node.
    pub async fn bias(&self, id: NodeId) -> Result<f64> {
        let cell = self.node(id).await?;
        let state = cell.state.lock().await;
        match &state.compute {
            Compute::Neuron(n) => Ok(n.bias()),
            _ => Err(SynapseError::input(format!("node {id} is not a neuron"))),
        }
    }

    pub async fn set_bias(&self, id: NodeId, bias: f64) -> Result<()> {
        let cell = self.node(id).await?;
        let mut state = cell.state.lock().await;
        match &mut state.compute {
            Compute::Neuron(n) => {
                n.set_bias(bias);
                Ok(())
            }
            _ => Err(SynapseError::input(format!("node {id} is not a neuron"))),
        }
    }

    /// Current weight of a weighted-edge node.
    pub async fn weight(&self, id: NodeId) -> Result<f64> {
        let cell = self.node(id).await?;
        let state = cell.state.lock().await;
        match &state.compute {
            Compute::Weight(w) => Ok(w.weight()),
            _ => Err(SynapseError::input(format!(
                "node {id} is not a weighted edge"
            ))),
        }
    }

    pub async fn set_weight(&self, id: NodeId, weight: f64) -> Result<()> {
        let cell = self.node(id).await?;
        let mut state = cell.state.lock().await;
        match &mut state.compute {
            Compute::Weight(w) => {
                w.set_weight(weight);
                Ok(())
            }
            _ => Err(SynapseError::input(format!(
                "node {id} is not a weighted edge"
            ))),
        }
    }

    /// Runs one forward pass over `inputs` (one value per input node, in
    /// order). After it returns, every node's computed value is available
    /// through [`Network::output`].
    pub async fn feed_forward(self: &Arc<Self>, inputs: &[f64]) -> Result<()> {
        engine::forward::run(self, inputs).await
    }

    /// Runs one backward pass, updating every weight and bias exactly once.
    /// A learning rate of zero computes gradients without moving anything.
    pub async fn back_propagate(self: &Arc<Self>, learning_rate: f64) -> Result<()> {
        engine::backward::run(self, learning_rate).await
    }
}

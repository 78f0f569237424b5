//! Layered network construction.
//!
//! Node ids are assigned densely in creation order: input neurons first,
//! then per hidden layer its neurons followed by one weighted-edge node per
//! (previous-layer node, layer neuron) pair, then the output neurons and
//! their weighted edges, and finally the single cost terminal fed by every
//! output neuron.

use std::collections::HashMap;
use std::sync::Arc;

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::DiGraph;
use tracing::debug;

use super::node::{NodeCell, NodeId};
use super::Network;
use crate::compute::{Compute, Cost, Neuron, Weight};
use crate::core::config::EngineConfig;
use crate::core::errors::{Result, SynapseError};

impl Network {
    /// Builds a fully-connected layered network with randomly initialised
    /// parameters and the default engine configuration.
    pub fn layered(inputs: usize, outputs: usize, hidden: &[usize]) -> Result<Arc<Self>> {
        Self::layered_with(inputs, outputs, hidden, EngineConfig::default())
    }

    /// Same as [`Network::layered`] with an explicit engine configuration.
    pub fn layered_with(
        inputs: usize,
        outputs: usize,
        hidden: &[usize],
        config: EngineConfig,
    ) -> Result<Arc<Self>> {
        config.validate()?;
        if inputs == 0 {
            return Err(SynapseError::topology("network needs at least one input"));
        }
        if outputs == 0 {
            return Err(SynapseError::topology("network needs at least one output"));
        }

        let mut cells: Vec<NodeCell> = Vec::new();

        // Input layer
        for _ in 0..inputs {
            push(&mut cells, Compute::Neuron(Neuron::new(random_unit())));
        }

        // Hidden layers, each wired to the previous layer through one
        // weighted-edge node per connection.
        let mut last_start = 0;
        let mut last_end = inputs - 1;
        for &width in hidden {
            if width == 0 {
                return Err(SynapseError::topology("hidden layer of width zero"));
            }
            let layer_start = cells.len();
            for _ in 0..width {
                push(&mut cells, Compute::Neuron(Neuron::new(random_unit())));
            }
            let layer_end = cells.len() - 1;

            for i in 0..(last_end - last_start + 1) {
                for j in 0..width {
                    let w = push(&mut cells, Compute::Weight(Weight::new(random_unit())));
                    connect(&mut cells, last_start + i, w);
                    connect(&mut cells, w, layer_start + j);
                }
            }

            last_start = layer_start;
            last_end = layer_end;
        }

        // Output layer and its weighted edges from the last layer
        let output_start = cells.len();
        for _ in 0..outputs {
            push(&mut cells, Compute::Neuron(Neuron::new(random_unit())));
        }
        for i in 0..(last_end - last_start + 1) {
            for j in 0..outputs {
                let w = push(&mut cells, Compute::Weight(Weight::new(random_unit())));
                connect(&mut cells, last_start + i, w);
                connect(&mut cells, w, output_start + j);
            }
        }

        // The cost terminal, fed by every output neuron
        let cost_id = push(&mut cells, Compute::Cost(Cost::new()));
        for j in 0..outputs {
            connect(&mut cells, output_start + j, cost_id);
        }

        validate_topology(&cells)?;
        debug!(
            nodes = cells.len(),
            inputs, outputs, cost_id, "built layered network"
        );

        let nodes: HashMap<NodeId, Arc<NodeCell>> = cells
            .into_iter()
            .map(|cell| (cell.id(), Arc::new(cell)))
            .collect();

        Ok(Arc::new(Network {
            nodes: tokio::sync::RwLock::new(nodes),
            outputs: dashmap::DashMap::new(),
            input_count: inputs,
            output_count: outputs,
            output_start,
            cost_id,
            config,
        }))
    }
}

fn random_unit() -> f64 {
    fastrand::f64() * 2.0 - 1.0
}

fn push(cells: &mut Vec<NodeCell>, compute: Compute) -> NodeId {
    let id = cells.len();
    cells.push(NodeCell::new(id, compute));
    id
}

fn connect(cells: &mut [NodeCell], from: NodeId, to: NodeId) {
    cells[from].outbound.push(to);
    cells[to].inbound.push(from);
}

/// Construction-time invariants: no dangling ids, symmetric adjacency, and
/// an acyclic graph. A violation here would stall a pass forever, so it is
/// refused up front.
fn validate_topology(cells: &[NodeCell]) -> Result<()> {
    for cell in cells {
        for &to in cell.outbound() {
            let peer = cells.get(to).ok_or_else(|| {
                SynapseError::topology(format!("node {} points at missing node {}", cell.id(), to))
            })?;
            if !peer.inbound().contains(&cell.id()) {
                return Err(SynapseError::topology(format!(
                    "edge {} -> {} has no matching inbound entry",
                    cell.id(),
                    to
                )));
            }
        }
        for &from in cell.inbound() {
            let peer = cells.get(from).ok_or_else(|| {
                SynapseError::topology(format!(
                    "node {} lists missing predecessor {}",
                    cell.id(),
                    from
                ))
            })?;
            if !peer.outbound().contains(&cell.id()) {
                return Err(SynapseError::topology(format!(
                    "edge {} -> {} has no matching outbound entry",
                    from,
                    cell.id()
                )));
            }
        }
    }

    let mut graph = DiGraph::<NodeId, ()>::new();
    let indices: Vec<_> = cells.iter().map(|cell| graph.add_node(cell.id())).collect();
    for cell in cells {
        for &to in cell.outbound() {
            graph.add_edge(indices[cell.id()], indices[to], ());
        }
    }
    if is_cyclic_directed(&graph) {
        return Err(SynapseError::topology("graph contains a cycle"));
    }

    Ok(())
}

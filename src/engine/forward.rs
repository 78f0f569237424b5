use std::sync::Arc;

use tracing::info;

use super::scheduler::run_pass;
use super::{Direction, Signal};
use crate::core::errors::{Result, SynapseError};
use crate::graph::Network;

/// Runs one forward pass. Convergence is over inbound edges, propagation
/// over outbound edges; the seed is one signal per input value, addressed
/// to the input nodes in order from the synthetic origin.
pub(crate) async fn run(network: &Arc<Network>, inputs: &[f64]) -> Result<()> {
    if inputs.len() != network.input_count() {
        return Err(SynapseError::input(format!(
            "expected {} input values, got {}",
            network.input_count(),
            inputs.len()
        )));
    }

    network.flush().await;

    let seeds = inputs
        .iter()
        .enumerate()
        .map(|(i, &value)| Signal {
            target: i,
            value,
            origin: None,
        })
        .collect();

    info!(inputs = inputs.len(), "starting forward pass");
    run_pass(network, Direction::Forward, 0.0, seeds).await
}

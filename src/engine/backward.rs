use std::sync::Arc;

use tracing::info;

use super::scheduler::run_pass;
use super::{Direction, Signal};
use crate::core::errors::{Result, SynapseError};
use crate::graph::Network;

/// Runs one backward pass. Convergence is over outbound edges, propagation
/// over inbound edges; the seed is a single unit-magnitude partial
/// addressed to the cost terminal.
///
/// A learning rate of zero is allowed and computes every gradient without
/// moving any parameter.
pub(crate) async fn run(network: &Arc<Network>, learning_rate: f64) -> Result<()> {
    if !learning_rate.is_finite() || learning_rate < 0.0 {
        return Err(SynapseError::input(format!(
            "learning rate must be finite and non-negative, got {learning_rate}"
        )));
    }

    network.flush().await;

    let seeds = vec![Signal {
        target: network.cost_node_id(),
        value: 1.0,
        origin: None,
    }];

    info!(learning_rate, "starting backward pass");
    run_pass(network, Direction::Backward, learning_rate, seeds).await
}

//! In-memory training loop: epochs of shuffled samples, each driven through
//! a set-targets / forward / backward cycle.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::errors::{Result, SynapseError};
use crate::graph::Network;

/// One labelled example: network inputs and the matching target outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub inputs: Vec<f64>,
    pub targets: Vec<f64>,
}

/// Epoch/shuffle driver around the two passes.
#[derive(Debug, Clone)]
pub struct Trainer {
    pub learning_rate: f64,
    pub epochs: usize,
}

impl Trainer {
    pub fn new(learning_rate: f64, epochs: usize) -> Self {
        Self {
            learning_rate,
            epochs,
        }
    }

    /// Shuffles and replays `samples` for the configured number of epochs.
    /// The sample order is permuted in place, every epoch.
    pub async fn run(&self, network: &Arc<Network>, samples: &mut [TrainingSample]) -> Result<()> {
        if samples.is_empty() {
            return Err(SynapseError::input("no training samples"));
        }

        for epoch in 0..self.epochs {
            shuffle(samples);
            for sample in samples.iter() {
                network.set_targets(&sample.targets).await?;
                network.feed_forward(&sample.inputs).await?;
                network.back_propagate(self.learning_rate).await?;
            }
            debug!(
                epoch,
                cost = network.cost().unwrap_or(f64::NAN),
                "epoch complete"
            );
        }
        Ok(())
    }
}

/// Fisher-Yates over the sample slice.
fn shuffle(samples: &mut [TrainingSample]) {
    for i in (1..samples.len()).rev() {
        samples.swap(i, fastrand::usize(..=i));
    }
}

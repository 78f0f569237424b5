use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, SynapseError};

/// Configuration for pass execution behavior
///
/// One configuration is attached to a network at construction time and
/// governs every pass run over it: how many workers each pool gets and how
/// much in-flight signal traffic the bounded queue tolerates before
/// producers are made to wait.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of workers consuming ready-node jobs (default: 2)
    #[serde(default = "default_workers")]
    pub compute_workers: usize,
    /// Number of workers consuming signal jobs (default: 2)
    #[serde(default = "default_workers")]
    pub aggregate_workers: usize,
    /// Capacity of the bounded signal queue. Producers suspend when it is
    /// full; this is the backpressure bound on in-flight signals.
    #[serde(default = "default_signal_queue_capacity")]
    pub signal_queue_capacity: usize,
}

fn default_workers() -> usize {
    2
}

fn default_signal_queue_capacity() -> usize {
    256
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            compute_workers: default_workers(),
            aggregate_workers: default_workers(),
            signal_queue_capacity: default_signal_queue_capacity(),
        }
    }
}

impl EngineConfig {
    /// Validates configuration values
    pub fn validate(&self) -> Result<()> {
        if self.compute_workers == 0 {
            return Err(SynapseError::configuration(
                "compute_workers must be greater than 0",
            ));
        }
        if self.aggregate_workers == 0 {
            return Err(SynapseError::configuration(
                "aggregate_workers must be greater than 0",
            ));
        }
        if self.signal_queue_capacity == 0 {
            return Err(SynapseError::configuration(
                "signal_queue_capacity must be greater than 0",
            ));
        }
        Ok(())
    }
}

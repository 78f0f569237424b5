use thiserror::Error;

use crate::graph::NodeId;

/// Unified error type for the synapse library
#[derive(Debug, Error)]
pub enum SynapseError {
    /// Malformed graph structure detected at construction time
    #[error("Invalid topology: {message}")]
    Topology { message: String },

    /// Lookup of a node id that is not in the graph. The engine treats this
    /// as a programming error and aborts the pass.
    #[error("Unknown node id: {id}")]
    UnknownNode { id: NodeId },

    /// Bad caller input (arity mismatch, learning rate, wrong node kind)
    #[error("Invalid input: {message}")]
    Input { message: String },

    /// Invalid engine configuration
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A worker queue closed while a pass was still in flight
    #[error("Queue '{queue}' closed while pass in flight")]
    QueueClosed { queue: &'static str },

    /// A worker task panicked or was aborted
    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl SynapseError {
    /// Create a topology error
    pub fn topology<S: Into<String>>(message: S) -> Self {
        Self::Topology {
            message: message.into(),
        }
    }

    /// Create an input error
    pub fn input<S: Into<String>>(message: S) -> Self {
        Self::Input {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Result type alias using SynapseError
pub type Result<T> = std::result::Result<T, SynapseError>;

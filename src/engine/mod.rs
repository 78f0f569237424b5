//! The propagation engine.
//!
//! One engine drives both passes. A pass is a stream of two job kinds:
//! signals (a scalar in flight between two nodes) and ready jobs (a node
//! whose convergence edge set has been fully heard from). Fixed pools of
//! workers consume each kind until the outstanding-work counter drains.

pub(crate) mod backward;
pub(crate) mod forward;
mod scheduler;
mod tracker;

use crate::graph::{NodeCell, NodeId};

/// Which way a pass flows through the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// The edges a node must hear from before it may fire.
    pub(crate) fn convergence(self, node: &NodeCell) -> &[NodeId] {
        match self {
            Direction::Forward => node.inbound(),
            Direction::Backward => node.outbound(),
        }
    }
}

/// A scalar value in flight from one node to a neighbor within one pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signal {
    pub target: NodeId,
    pub value: f64,
    /// `None` marks the synthetic origin used to seed a pass.
    pub origin: Option<NodeId>,
}

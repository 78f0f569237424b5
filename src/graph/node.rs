use tokio::sync::Mutex;

use crate::compute::{Compute, SignalMap};

/// Dense node identifier, assigned once at construction and never reused.
pub type NodeId = usize;

/// Where a node stands within the current pass. Flush resets every node to
/// `Pending`; aggregation moves it to `Ready` exactly once; the compute
/// step leaves it `Fired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassPhase {
    Pending,
    Ready,
    Fired,
}

/// The mutable per-pass state of a node. Guarded by the node's own lock:
/// recording a value, checking the convergence threshold, and the phase
/// transition are one critical section.
#[derive(Debug)]
pub struct NodeState {
    pub(crate) pending: SignalMap,
    pub(crate) phase: PassPhase,
    pub(crate) compute: Compute,
}

/// A vertex of the network graph.
///
/// Adjacency is fixed at construction; everything that mutates during a
/// pass lives behind the per-node mutex, so distinct nodes never contend.
#[derive(Debug)]
pub struct NodeCell {
    id: NodeId,
    pub(crate) inbound: Vec<NodeId>,
    pub(crate) outbound: Vec<NodeId>,
    pub(crate) state: Mutex<NodeState>,
}

impl NodeCell {
    pub(crate) fn new(id: NodeId, compute: Compute) -> Self {
        Self {
            id,
            inbound: Vec::new(),
            outbound: Vec::new(),
            state: Mutex::new(NodeState {
                pending: SignalMap::new(),
                phase: PassPhase::Pending,
                compute,
            }),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Predecessor node ids (edges pointing in).
    pub fn inbound(&self) -> &[NodeId] {
        &self.inbound
    }

    /// Successor node ids (edges pointing out).
    pub fn outbound(&self) -> &[NodeId] {
        &self.outbound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::Neuron;

    #[tokio::test]
    async fn new_cell_starts_pending_and_empty() {
        let cell = NodeCell::new(3, Compute::Neuron(Neuron::new(0.1)));
        assert_eq!(cell.id(), 3);
        assert!(cell.inbound().is_empty());
        assert!(cell.outbound().is_empty());

        let state = cell.state.lock().await;
        assert_eq!(state.phase, PassPhase::Pending);
        assert!(state.pending.is_empty());
    }
}

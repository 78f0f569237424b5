//! Pass scheduler: worker pools, bounded queues, completion detection.
//!
//! Two pools run for the duration of one pass. Aggregation workers consume
//! signals: record the value under its origin in the target node's pending
//! map and, inside that node's critical section, decide whether the node
//! has now heard from its whole convergence edge set. Compute workers
//! consume ready nodes: invoke the node's compute capability once and fan
//! the results out as new signals.
//!
//! The signal queue is bounded by configuration and provides backpressure.
//! The ready queue is sized to the node count: a node becomes ready at most
//! once per pass, so ready sends can never block and the two queues cannot
//! form a wait cycle.

use std::sync::Arc;

use futures::future::try_join_all;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, error, info};

use super::tracker::WorkTracker;
use super::{Direction, Signal};
use crate::compute::signal_sum;
use crate::core::errors::{Result, SynapseError};
use crate::graph::node::NodeState;
use crate::graph::{Network, NodeId, PassPhase};

type SharedReceiver<T> = Arc<Mutex<mpsc::Receiver<T>>>;

/// Everything the workers of one pass share.
struct PassContext {
    network: Arc<Network>,
    direction: Direction,
    learning_rate: f64,
    tracker: WorkTracker,
    faults: std::sync::Mutex<Vec<SynapseError>>,
}

impl PassContext {
    /// Records a worker fault and cancels the pass so the driver stops
    /// waiting for the queues to drain.
    fn fault(&self, err: SynapseError) {
        error!(error = %err, "pass worker fault");
        if let Ok(mut faults) = self.faults.lock() {
            faults.push(err);
        }
        self.tracker.cancel();
    }

    fn take_fault(&self) -> Option<SynapseError> {
        let mut faults = self.faults.lock().ok()?;
        if faults.is_empty() {
            None
        } else {
            Some(faults.remove(0))
        }
    }
}

/// Drives one full pass to completion: seeds the queues, runs both worker
/// pools until the outstanding-work counter drains, then tears them down.
pub(crate) async fn run_pass(
    network: &Arc<Network>,
    direction: Direction,
    learning_rate: f64,
    seeds: Vec<Signal>,
) -> Result<()> {
    let config = network.config().clone();
    let ctx = Arc::new(PassContext {
        network: Arc::clone(network),
        direction,
        learning_rate,
        tracker: WorkTracker::new(),
        faults: std::sync::Mutex::new(Vec::new()),
    });

    let (signal_tx, signal_rx) = mpsc::channel::<Signal>(config.signal_queue_capacity);
    let ready_capacity = network.node_count().await.max(1);
    let (ready_tx, ready_rx) = mpsc::channel::<NodeId>(ready_capacity);
    let signal_rx: SharedReceiver<Signal> = Arc::new(Mutex::new(signal_rx));
    let ready_rx: SharedReceiver<NodeId> = Arc::new(Mutex::new(ready_rx));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut workers = Vec::with_capacity(config.aggregate_workers + config.compute_workers);
    for _ in 0..config.aggregate_workers {
        workers.push(tokio::spawn(aggregate_worker(
            Arc::clone(&ctx),
            Arc::clone(&signal_rx),
            ready_tx.clone(),
            shutdown_rx.clone(),
        )));
    }
    for _ in 0..config.compute_workers {
        workers.push(tokio::spawn(compute_worker(
            Arc::clone(&ctx),
            Arc::clone(&ready_rx),
            signal_tx.clone(),
            shutdown_rx.clone(),
        )));
    }

    debug!(?direction, seeds = seeds.len(), "seeding pass");
    ctx.tracker.add(seeds.len());
    for seed in seeds {
        if signal_tx.send(seed).await.is_err() {
            ctx.fault(SynapseError::QueueClosed { queue: "signal" });
            break;
        }
    }
    drop(signal_tx);
    drop(ready_tx);

    ctx.tracker.wait_idle().await;
    let _ = shutdown_tx.send(true);
    try_join_all(workers).await?;

    if let Some(err) = ctx.take_fault() {
        return Err(err);
    }
    info!(?direction, "pass complete");
    Ok(())
}

/// Pops one job from a pool's shared queue, or `None` on shutdown.
async fn recv_job<T>(rx: &SharedReceiver<T>, shutdown: &mut watch::Receiver<bool>) -> Option<T> {
    let mut rx = rx.lock().await;
    tokio::select! {
        job = rx.recv() => job,
        _ = shutdown.changed() => None,
    }
}

async fn aggregate_worker(
    ctx: Arc<PassContext>,
    rx: SharedReceiver<Signal>,
    ready_tx: mpsc::Sender<NodeId>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let Some(signal) = recv_job(&rx, &mut shutdown).await else {
            break;
        };
        let ready = match aggregate(&ctx, signal).await {
            Ok(ready) => ready,
            Err(err) => {
                ctx.fault(err);
                break;
            }
        };
        if let Some(id) = ready {
            ctx.tracker.add(1);
            // The ready queue is sized to the node count, so this send
            // only parks if the pass is being torn down.
            let sent = tokio::select! {
                res = ready_tx.send(id) => res.is_ok(),
                _ = shutdown.changed() => false,
            };
            if !sent {
                if !ctx.tracker.is_cancelled() {
                    ctx.fault(SynapseError::QueueClosed { queue: "ready" });
                }
                break;
            }
        }
        ctx.tracker.done();
    }
}

/// Records one signal into its target node. Returns the node's id when the
/// recording completed the node's convergence edge set.
///
/// The insert, the threshold check, and the phase transition are a single
/// critical section under the node's own lock: two workers aggregating
/// into the same node can neither drop the transition nor take it twice.
async fn aggregate(ctx: &PassContext, signal: Signal) -> Result<Option<NodeId>> {
    let node = ctx.network.node(signal.target).await?;
    let mut state = node.state.lock().await;
    state.pending.insert(signal.origin, signal.value);

    let threshold = ctx.direction.convergence(&node).len();
    if state.phase == PassPhase::Pending && state.pending.len() >= threshold {
        state.phase = PassPhase::Ready;
        debug!(node = node.id(), direction = ?ctx.direction, "node ready");
        Ok(Some(node.id()))
    } else {
        Ok(None)
    }
}

async fn compute_worker(
    ctx: Arc<PassContext>,
    rx: SharedReceiver<NodeId>,
    signal_tx: mpsc::Sender<Signal>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let Some(node_id) = recv_job(&rx, &mut shutdown).await else {
            break;
        };
        let fanout = match fire(&ctx, node_id).await {
            Ok(fanout) => fanout,
            Err(err) => {
                ctx.fault(err);
                break;
            }
        };
        ctx.tracker.add(fanout.len());
        let mut closed = false;
        for signal in fanout {
            let sent = tokio::select! {
                res = signal_tx.send(signal) => res.is_ok(),
                _ = shutdown.changed() => false,
            };
            if !sent {
                closed = true;
                break;
            }
        }
        if closed {
            if !ctx.tracker.is_cancelled() {
                ctx.fault(SynapseError::QueueClosed { queue: "signal" });
            }
            break;
        }
        ctx.tracker.done();
    }
}

/// Fires one ready node: runs its compute capability over the aggregated
/// values and returns the signals to fan out along the pass's propagation
/// edge set.
///
/// Forward fans the single computed output to every outbound neighbor.
/// Backward invokes the capability once per inbound edge - every call sees
/// the same aggregated partial sum - and sends each edge its own result; a
/// node with no inbound edges still gets one call so the input layer's
/// biases are updated.
async fn fire(ctx: &PassContext, id: NodeId) -> Result<Vec<Signal>> {
    let node = ctx.network.node(id).await?;
    let mut state = node.state.lock().await;
    let NodeState {
        pending,
        phase,
        compute,
    } = &mut *state;

    let fanout = match ctx.direction {
        Direction::Forward => {
            let output = compute.forward(pending);
            ctx.network.record_output(id, output);
            debug!(node = id, output, "node fired");
            node.outbound()
                .iter()
                .map(|&target| Signal {
                    target,
                    value: output,
                    origin: Some(id),
                })
                .collect()
        }
        Direction::Backward => {
            let partial_sum = signal_sum(pending);
            debug!(node = id, partial_sum, "node fired");
            if node.inbound().is_empty() {
                compute.backward(partial_sum, ctx.learning_rate, None);
                Vec::new()
            } else {
                node.inbound()
                    .iter()
                    .map(|&edge| Signal {
                        target: edge,
                        value: compute.backward(partial_sum, ctx.learning_rate, Some(edge)),
                        origin: Some(id),
                    })
                    .collect()
            }
        }
    };
    *phase = PassPhase::Fired;
    Ok(fanout)
}

use std::collections::BTreeMap;

use super::SignalMap;
use crate::graph::NodeId;

/// The terminal cost unit: records the output layer's activations and
/// scores them against configured targets with half the summed squared
/// error. It is the unique origin of backward propagation, so its backward
/// operation ignores the aggregated partial entirely.
#[derive(Debug, Clone, Default)]
pub struct Cost {
    targets: BTreeMap<NodeId, f64>,
    actual: BTreeMap<NodeId, f64>,
}

impl Cost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target values keyed by output node id. Replaces any previous set.
    pub(crate) fn set_targets(&mut self, targets: BTreeMap<NodeId, f64>) {
        self.targets = targets;
    }

    pub(crate) fn forward(&mut self, inputs: &SignalMap) -> f64 {
        self.actual = inputs
            .iter()
            .filter_map(|(origin, value)| origin.map(|id| (id, *value)))
            .collect();
        total_cost(&self.targets, &self.actual)
    }

    /// The cost partial for one inbound edge: `actual - target`. A missing
    /// edge (the synthetic seed) contributes nothing.
    pub(crate) fn backward(&self, edge: Option<NodeId>) -> f64 {
        match edge {
            Some(id) => cost_input_partial(
                self.targets.get(&id).copied().unwrap_or(0.0),
                self.actual.get(&id).copied().unwrap_or(0.0),
            ),
            None => 0.0,
        }
    }
}

/// Half the sum of squared differences between targets and actuals.
/// An actual value never received reads as 0.0.
pub(crate) fn total_cost(targets: &BTreeMap<NodeId, f64>, actual: &BTreeMap<NodeId, f64>) -> f64 {
    targets
        .iter()
        .map(|(id, target)| {
            let a = actual.get(id).copied().unwrap_or(0.0);
            0.5 * (target - a).powi(2)
        })
        .sum()
}

pub(crate) fn cost_input_partial(target: f64, actual: f64) -> f64 {
    -(target - actual)
}

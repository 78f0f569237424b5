use super::{learn, signal_sum, SignalMap};

/// A multiplicative scalar edge between two neurons.
#[derive(Debug, Clone)]
pub struct Weight {
    weight: f64,
}

impl Weight {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    pub(crate) fn forward(&mut self, inputs: &SignalMap) -> f64 {
        signal_sum(inputs) * self.weight
    }

    /// Returns the pre-update contribution `weight * partial_sum`, then
    /// steps the weight against that same value.
    pub(crate) fn backward(&mut self, partial_sum: f64, rate: f64) -> f64 {
        let out = self.weight * partial_sum;
        self.weight = learn(self.weight, rate, out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_scales_the_single_input() {
        let mut weight = Weight::new(0.75);
        let mut inputs = SignalMap::new();
        inputs.insert(Some(2), 0.4);
        assert_eq!(weight.forward(&inputs), 0.3);
    }

    #[test]
    fn backward_returns_pre_update_contribution() {
        let mut weight = Weight::new(0.5);
        let out = weight.backward(2.0, 0.1);
        assert_eq!(out, 1.0);
        // weight stepped by rate * out after the contribution was taken
        assert_eq!(weight.weight(), 0.5 - 0.1);
    }

    #[test]
    fn backward_with_zero_rate_keeps_weight() {
        let mut weight = Weight::new(-0.8);
        let out = weight.backward(0.5, 0.0);
        assert_eq!(out, -0.4);
        assert_eq!(weight.weight(), -0.8);
    }
}

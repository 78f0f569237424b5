use super::{learn, sigmoid, signal_sum, SignalMap};

/// A plain neuron: a multiplicative bias followed by a logistic sigmoid.
///
/// The pre-activation sum and the activation are retained from the forward
/// pass; the backward pass needs both to form its partials.
#[derive(Debug, Clone)]
pub struct Neuron {
    bias: f64,
    input_sum: f64,
    activation: f64,
}

impl Neuron {
    pub fn new(bias: f64) -> Self {
        Self {
            bias,
            input_sum: 0.0,
            activation: 0.0,
        }
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn set_bias(&mut self, bias: f64) {
        self.bias = bias;
    }

    pub(crate) fn forward(&mut self, inputs: &SignalMap) -> f64 {
        self.input_sum = signal_sum(inputs);
        self.activation = sigmoid(self.input_sum * self.bias);
        self.activation
    }

    /// Propagates `partial_sum` through the sigmoid slope twice: scaled by
    /// the bias for the value sent upstream, scaled by the pre-activation
    /// sum for the bias's own gradient. The bias update happens here.
    pub(crate) fn backward(&mut self, partial_sum: f64, rate: f64) -> f64 {
        let slope = self.activation * (1.0 - self.activation);
        let input_partial = self.bias * slope * partial_sum;
        let bias_partial = self.input_sum * slope * partial_sum;
        self.bias = learn(self.bias, rate, bias_partial);
        input_partial
    }
}

//! Backward-pass behaviour: gradient propagation and parameter updates.

use anyhow::Result;
use synapse::{sigmoid, Network, Trainer, TrainingSample};

fn close(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

/// Collects every parameter in the network as (id, raw bits) pairs.
async fn parameter_bits(network: &std::sync::Arc<Network>) -> Vec<(usize, u64)> {
    let mut params = Vec::new();
    for id in 0..network.node_count().await {
        if let Ok(bias) = network.bias(id).await {
            params.push((id, bias.to_bits()));
        } else if let Ok(weight) = network.weight(id).await {
            params.push((id, weight.to_bits()));
        }
    }
    params
}

#[tokio::test]
async fn zero_learning_rate_is_a_no_op() -> Result<()> {
    let network = Network::layered(2, 1, &[2])?;
    network.set_targets(&[0.25]).await?;
    network.feed_forward(&[0.4, -0.6]).await?;

    let before = parameter_bits(&network).await;
    network.back_propagate(0.0).await?;
    let after = parameter_bits(&network).await;

    assert_eq!(before, after);
    Ok(())
}

#[tokio::test]
async fn single_chain_updates_match_hand_derivation() -> Result<()> {
    // ids in a 1-0-1 network: 0 input neuron, 1 output neuron, 2 weight, 3 cost
    let (b0, b1, w, x, target, rate) = (0.5, -0.25, 0.75, 0.8, 0.5, 0.1);
    let network = Network::layered(1, 1, &[])?;
    network.set_bias(0, b0).await?;
    network.set_bias(1, b1).await?;
    network.set_weight(2, w).await?;
    network.set_targets(&[target]).await?;

    network.feed_forward(&[x]).await?;
    network.back_propagate(rate).await?;

    // forward activations
    let a0 = sigmoid(x * b0);
    let s1 = a0 * w;
    let a1 = sigmoid(s1 * b1);

    // cost node emits actual - target toward the output neuron
    let d = a1 - target;

    // output neuron: propagates bias-scaled slope, updates its own bias
    let slope1 = a1 * (1.0 - a1);
    let p_to_weight = b1 * slope1 * d;
    let b1_expected = b1 - rate * (s1 * slope1 * d);

    // weight node: contribution taken before the update
    let p_to_input = w * p_to_weight;
    let w_expected = w - rate * p_to_input;

    // input neuron: terminal call, bias update only
    let slope0 = a0 * (1.0 - a0);
    let b0_expected = b0 - rate * (x * slope0 * p_to_input);

    assert!(close(network.bias(1).await?, b1_expected, 1e-12));
    assert!(close(network.weight(2).await?, w_expected, 1e-12));
    assert!(close(network.bias(0).await?, b0_expected, 1e-12));
    Ok(())
}

#[tokio::test]
async fn backward_requires_sane_learning_rate() -> Result<()> {
    let network = Network::layered(1, 1, &[])?;
    network.set_targets(&[0.5]).await?;
    network.feed_forward(&[0.1]).await?;

    assert!(network.back_propagate(-0.5).await.is_err());
    assert!(network.back_propagate(f64::NAN).await.is_err());
    assert!(network.back_propagate(f64::INFINITY).await.is_err());
    assert!(network.back_propagate(0.01).await.is_ok());
    Ok(())
}

#[tokio::test]
async fn training_moves_parameters_and_keeps_cost_finite() -> Result<()> {
    let network = Network::layered(2, 1, &[3])?;
    let before = parameter_bits(&network).await;

    let mut samples = vec![
        TrainingSample {
            inputs: vec![0.0, 1.0],
            targets: vec![0.8],
        },
        TrainingSample {
            inputs: vec![1.0, 0.0],
            targets: vec![0.2],
        },
    ];

    let trainer = Trainer::new(0.05, 10);
    trainer.run(&network, &mut samples).await?;

    let after = parameter_bits(&network).await;
    assert_ne!(before, after, "training never touched any parameter");

    let cost = network.cost().expect("no cost recorded");
    assert!(cost.is_finite());
    Ok(())
}

#[tokio::test]
async fn gradients_flow_all_the_way_to_the_input_layer() -> Result<()> {
    let network = Network::layered(1, 1, &[2])?;
    network.set_targets(&[0.9]).await?;

    let input_bias_before = network.bias(0).await?;
    network.feed_forward(&[0.7]).await?;
    network.back_propagate(0.5).await?;
    let input_bias_after = network.bias(0).await?;

    assert_ne!(input_bias_before, input_bias_after);
    Ok(())
}

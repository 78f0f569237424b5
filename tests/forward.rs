//! Forward-pass behaviour over small fixed networks.

use anyhow::Result;
use synapse::{sigmoid, Network};

fn close(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

/// Pins every parameter so the pass is fully predictable: all neuron
/// biases to `bias`, all edge weights to `weight`.
async fn pin_parameters(network: &std::sync::Arc<Network>, bias: f64, weight: f64) -> Result<()> {
    for id in 0..network.node_count().await {
        if network.set_bias(id, bias).await.is_ok() {
            continue;
        }
        let _ = network.set_weight(id, weight).await;
    }
    Ok(())
}

#[tokio::test]
async fn single_chain_yields_midpoint_activation() -> Result<()> {
    // 1 input, no hidden layers, 1 output. Output bias zero means the
    // output neuron computes sigmoid(anything * 0) = 0.5.
    let network = Network::layered(1, 1, &[])?;
    network.set_bias(network.output_node_id(0), 0.0).await?;
    pin_weights(&network, 1.0).await;

    network.feed_forward(&[0.0]).await?;
    assert_eq!(network.output(network.output_node_id(0)), Some(0.5));
    Ok(())
}

async fn pin_weights(network: &std::sync::Arc<Network>, weight: f64) {
    for id in 0..network.node_count().await {
        let _ = network.set_weight(id, weight).await;
    }
}

#[tokio::test]
async fn every_node_fires_exactly_once() -> Result<()> {
    let network = Network::layered(2, 2, &[3])?;
    network.feed_forward(&[0.25, -0.5]).await?;

    for id in 0..network.node_count().await {
        assert!(
            network.output(id).is_some(),
            "node {id} never recorded an output"
        );
    }
    Ok(())
}

#[tokio::test]
async fn hand_computed_chain_matches() -> Result<()> {
    // ids in a 1-0-1 network: 0 input neuron, 1 output neuron, 2 weight, 3 cost
    let network = Network::layered(1, 1, &[])?;
    network.set_bias(0, 0.5).await?;
    network.set_bias(1, -0.25).await?;
    network.set_weight(2, 0.75).await?;
    network.set_targets(&[0.5]).await?;

    let x = 0.8;
    network.feed_forward(&[x]).await?;

    let a0 = sigmoid(x * 0.5);
    let edge = a0 * 0.75;
    let a1 = sigmoid(edge * -0.25);
    let cost = 0.5 * (0.5 - a1) * (0.5 - a1);

    assert!(close(network.output(0).unwrap(), a0, 1e-12));
    assert!(close(network.output(2).unwrap(), edge, 1e-12));
    assert!(close(network.output(1).unwrap(), a1, 1e-12));
    assert!(close(network.cost().unwrap(), cost, 1e-12));
    Ok(())
}

#[tokio::test]
async fn repeated_passes_are_bit_identical() -> Result<()> {
    let network = Network::layered(3, 2, &[4, 4])?;
    let inputs = [0.3, -0.7, 0.05];

    network.feed_forward(&inputs).await?;
    let first: Vec<u64> = (0..network.node_count().await)
        .map(|id| network.output(id).unwrap().to_bits())
        .collect();

    network.feed_forward(&inputs).await?;
    let second: Vec<u64> = (0..network.node_count().await)
        .map(|id| network.output(id).unwrap().to_bits())
        .collect();

    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn stale_pending_values_never_leak_between_passes() -> Result<()> {
    let reference = Network::layered(2, 1, &[2])?;
    let network = Network::layered(2, 1, &[2])?;
    pin_parameters(&reference, 0.3, 0.7).await?;
    pin_parameters(&network, 0.3, 0.7).await?;

    // the reference sees only the second input; the other network runs a
    // different pass first
    network.feed_forward(&[0.9, -0.9]).await?;
    network.feed_forward(&[0.1, 0.2]).await?;
    reference.feed_forward(&[0.1, 0.2]).await?;

    assert_eq!(
        network.output(network.output_node_id(0)),
        reference.output(reference.output_node_id(0))
    );
    Ok(())
}

#[tokio::test]
async fn input_arity_is_validated() -> Result<()> {
    let network = Network::layered(2, 1, &[])?;
    assert!(network.feed_forward(&[1.0]).await.is_err());
    assert!(network.feed_forward(&[1.0, 2.0, 3.0]).await.is_err());
    assert!(network.feed_forward(&[1.0, 2.0]).await.is_ok());
    Ok(())
}

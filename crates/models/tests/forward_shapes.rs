use burn::backend::Autodiff;
use burn::backend::ndarray::NdArray;
use burn::optim::GradientsParams;
use burn::tensor::Tensor;
use graph_data::{GraphTensors, TransactionGraph};
use models::prelude::*;

type Backend = NdArray<f32>;
type ADBackend = Autodiff<Backend>;

fn to_vec<B: burn::tensor::backend::Backend, const D: usize>(t: Tensor<B, D>) -> Vec<f32> {
    t.into_data().convert::<f32>().to_vec::<f32>().unwrap_or_default()
}

/// Edges 0->2, 1->2, 2->0; node 1 has no incoming edge.
fn small_graph(feature_dim: usize) -> TransactionGraph {
    let rows = (0..3)
        .map(|i| (0..feature_dim).map(|j| (i * feature_dim + j) as f32 * 0.1).collect())
        .collect();
    TransactionGraph::from_rows(vec![0, 1, 2], vec![2, 2, 0], rows).unwrap()
}

#[test]
fn attention_normalizes_per_destination() {
    let device = Default::default();
    let graph = GraphTensors::<Backend>::from_graph(&small_graph(4), &device);
    let layer = GatV2ConvConfig::new(4, 3, 2).init::<Backend>(&device);

    let (out, alpha) = layer.forward_with_attention(&graph, graph.features.clone());
    assert_eq!(out.dims(), [3, 2, 3]);
    assert_eq!(alpha.dims(), [3, 2]);

    let alpha = to_vec(alpha);
    for h in 0..2 {
        let into_two = alpha[h] + alpha[2 + h];
        assert!((into_two - 1.0).abs() < 1e-5, "head {h}: {into_two}");
        assert!((alpha[4 + h] - 1.0).abs() < 1e-5);
    }
}

#[test]
fn zero_in_degree_node_aggregates_to_zero() {
    let device = Default::default();
    let graph = GraphTensors::<Backend>::from_graph(&small_graph(4), &device);
    let layer = GatV2ConvConfig {
        activation: true,
        ..GatV2ConvConfig::new(4, 3, 2)
    }
    .init::<Backend>(&device);

    let out = to_vec(layer.forward(&graph, graph.features.clone()));
    // Node 1 occupies elements 6..12 of the [3, 2, 3] output.
    assert!(out[6..12].iter().all(|v| v.abs() < 1e-6));
    assert!(out.iter().all(|v| v.is_finite()));
}

#[test]
fn encoder_outputs_one_embedding_per_node() {
    let device = Default::default();
    let cfg = GatV2Config {
        in_dim: 4,
        num_hidden: 6,
        num_classes: 5,
        heads: vec![2, 3, 2],
        ..Default::default()
    };
    let graph = GraphTensors::<Backend>::from_graph(&small_graph(4), &device);
    let model = LinkPredictor::<Backend>::new(&cfg, &device).unwrap();
    assert_eq!(model.encoder.num_layers(), 4);

    let h = model.embed(&graph);
    assert_eq!(h.dims(), [3, 5]);

    let pairs = Tensor::cat(vec![h.clone(), h], 1);
    assert_eq!(model.score(pairs).dims(), [3, 1]);
}

#[test]
fn gradients_reach_every_layer() {
    let device = Default::default();
    let cfg = GatV2Config {
        in_dim: 4,
        num_hidden: 4,
        num_classes: 2,
        heads: vec![2, 2],
        num_layers: 2,
        ..Default::default()
    };
    let graph = GraphTensors::<ADBackend>::from_graph(&small_graph(4), &device);
    let model = LinkPredictor::<ADBackend>::new(&cfg, &device).unwrap();

    let h = model.embed(&graph);
    let logits = model.score(Tensor::cat(vec![h.clone(), h], 1));
    let grads = logits.sum().backward();

    // fc + attn per layer, one residual projection on the output layer, probe weight + bias.
    let grads = GradientsParams::from_grads(grads, &model);
    assert_eq!(grads.len(), 2 + 2 + 3 + 2);
}

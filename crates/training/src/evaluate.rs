use burn::tensor::activation::sigmoid;
use burn::tensor::backend::Backend;
use graph_data::SplitKind;
use models::LinkPredictor;

use crate::edges::{host_labels, labelled_edges, LinkTensors};
use crate::metrics::{link_metrics, LinkMetrics};

/// Decision threshold applied to sigmoid scores.
pub const THRESHOLD: f32 = 0.5;

/// Sigmoid link scores for a split, positives first.
pub fn split_scores<B: Backend>(
    model: &LinkPredictor<B>,
    data: &LinkTensors<B>,
    split: SplitKind,
) -> anyhow::Result<(Vec<bool>, Vec<f32>)> {
    let (pos, neg) = data.pair(split);
    let h = model.embed(&data.graph);
    let (emb, _) = labelled_edges(h, pos, neg);
    let scores = sigmoid(model.score(emb))
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| anyhow::anyhow!("failed to read {split} scores back to host: {e:?}"))?;
    Ok((host_labels(pos.len, neg.len), scores))
}

pub fn evaluate_split<B: Backend>(
    model: &LinkPredictor<B>,
    data: &LinkTensors<B>,
    split: SplitKind,
) -> anyhow::Result<LinkMetrics> {
    let (labels, scores) = split_scores(model, data, split)?;
    link_metrics(&labels, &scores, THRESHOLD)
        .map_err(|e| anyhow::anyhow!("failed to score {split} edges: {e}"))
}

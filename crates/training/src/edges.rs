//! Edge embeddings: concatenated source and destination node embeddings.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use graph_data::{EdgeBatch, GraphTensors, LinkDataset, SplitKind};

/// `[h[src], h[dst]]` per edge, shape [num_edges, 2 * embedding_dim].
pub fn edge_embeddings<B: Backend>(h: Tensor<B, 2>, edges: &EdgeBatch<B>) -> Tensor<B, 2> {
    let src = h.clone().select(0, edges.src.clone());
    let dst = h.select(0, edges.dst.clone());
    Tensor::cat(vec![src, dst], 1)
}

/// Positive embeddings followed by negative ones, with labels 1 then 0 (shape [P + N, 1]).
pub fn labelled_edges<B: Backend>(
    h: Tensor<B, 2>,
    positive: &EdgeBatch<B>,
    negative: &EdgeBatch<B>,
) -> (Tensor<B, 2>, Tensor<B, 2>) {
    let device = h.device();
    let pos = edge_embeddings(h.clone(), positive);
    let neg = edge_embeddings(h, negative);
    let labels = Tensor::cat(
        vec![
            Tensor::<B, 2>::ones([positive.len, 1], &device),
            Tensor::<B, 2>::zeros([negative.len, 1], &device),
        ],
        0,
    );
    (Tensor::cat(vec![pos, neg], 0), labels)
}

/// Host-side labels in the same order as `labelled_edges`.
pub fn host_labels(positive: usize, negative: usize) -> Vec<bool> {
    let mut labels = vec![true; positive];
    labels.resize(positive + negative, false);
    labels
}

/// Graph plus the six edge lists, uploaded once per backend.
#[derive(Debug, Clone)]
pub struct LinkTensors<B: Backend> {
    pub graph: GraphTensors<B>,
    splits: [(EdgeBatch<B>, EdgeBatch<B>); 3],
}

impl<B: Backend> LinkTensors<B> {
    pub fn from_dataset(dataset: &LinkDataset, device: &B::Device) -> Self {
        let upload = |split| {
            let (pos, neg) = dataset.splits.pair(split);
            (
                EdgeBatch::from_index(pos, device),
                EdgeBatch::from_index(neg, device),
            )
        };
        Self {
            graph: GraphTensors::from_graph(&dataset.graph, device),
            splits: [
                upload(SplitKind::Train),
                upload(SplitKind::Validation),
                upload(SplitKind::Test),
            ],
        }
    }

    /// Positive and negative edges of one split.
    pub fn pair(&self, split: SplitKind) -> (&EdgeBatch<B>, &EdgeBatch<B>) {
        let (pos, neg) = match split {
            SplitKind::Train => &self.splits[0],
            SplitKind::Validation => &self.splits[1],
            SplitKind::Test => &self.splits[2],
        };
        (pos, neg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_labels_put_positives_first() {
        assert_eq!(host_labels(2, 3), vec![true, true, false, false, false]);
    }
}

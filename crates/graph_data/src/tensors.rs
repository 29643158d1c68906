//! Burn tensor views of the graph and of edge lists.

use crate::edges::EdgeIndex;
use crate::graph::TransactionGraph;
use burn::tensor::{backend::Backend, Int, Tensor, TensorData};

/// Full-graph inputs for one forward pass.
#[derive(Debug, Clone)]
pub struct GraphTensors<B: Backend> {
    /// Node features (shape: [num_nodes, feature_dim]).
    pub features: Tensor<B, 2>,
    /// Message sources (shape: [num_edges]).
    pub src: Tensor<B, 1, Int>,
    /// Message destinations (shape: [num_edges]).
    pub dst: Tensor<B, 1, Int>,
    pub num_nodes: usize,
    /// Per-edge destination ids kept on the host for segment reductions.
    pub dst_host: Vec<i64>,
}

impl<B: Backend> GraphTensors<B> {
    pub fn from_graph(graph: &TransactionGraph, device: &B::Device) -> Self {
        let features = Tensor::<B, 2>::from_data(
            TensorData::new(graph.features.clone(), [graph.num_nodes, graph.feature_dim])
                .convert::<B::FloatElem>(),
            device,
        );
        Self {
            features,
            src: index_tensor::<B>(&graph.src, device),
            dst: index_tensor::<B>(&graph.dst, device),
            num_nodes: graph.num_nodes,
            dst_host: graph.dst.clone(),
        }
    }

    pub fn num_edges(&self) -> usize {
        self.dst_host.len()
    }
}

/// Endpoint indices for one edge list, ready for `Tensor::select`.
#[derive(Debug, Clone)]
pub struct EdgeBatch<B: Backend> {
    pub src: Tensor<B, 1, Int>,
    pub dst: Tensor<B, 1, Int>,
    pub len: usize,
}

impl<B: Backend> EdgeBatch<B> {
    pub fn from_index(edges: &EdgeIndex, device: &B::Device) -> Self {
        Self {
            src: index_tensor::<B>(&edges.src, device),
            dst: index_tensor::<B>(&edges.dst, device),
            len: edges.len(),
        }
    }
}

fn index_tensor<B: Backend>(ids: &[i64], device: &B::Device) -> Tensor<B, 1, Int> {
    Tensor::<B, 1, Int>::from_data(
        TensorData::new(ids.to_vec(), [ids.len()]).convert::<B::IntElem>(),
        device,
    )
}

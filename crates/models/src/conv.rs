//! Single GATv2 attention layer over a directed edge list.

use burn::module::{Module, Param};
use burn::nn::{self, Dropout, DropoutConfig, Initializer, LinearConfig};
use burn::tensor::activation::{leaky_relu, relu};
use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor, TensorData};
use graph_data::GraphTensors;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatV2ConvConfig {
    pub in_dim: usize,
    pub out_dim: usize,
    pub heads: usize,
    pub feat_drop: f64,
    pub attn_drop: f64,
    pub negative_slope: f64,
    pub residual: bool,
    /// Apply ELU to the layer output.
    pub activation: bool,
}

impl GatV2ConvConfig {
    pub fn new(in_dim: usize, out_dim: usize, heads: usize) -> Self {
        Self {
            in_dim,
            out_dim,
            heads,
            feat_drop: 0.0,
            attn_drop: 0.0,
            negative_slope: 0.2,
            residual: false,
            activation: false,
        }
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> GatV2Conv<B> {
        let gain = 2f64.sqrt();
        let width = self.heads * self.out_dim;
        // Source and destination projections share one weight matrix.
        let fc = LinearConfig::new(self.in_dim, width)
            .with_bias(false)
            .with_initializer(Initializer::XavierNormal { gain })
            .init(device);
        let attn = Initializer::XavierNormal { gain }.init_with(
            [self.heads, self.out_dim],
            Some(width),
            Some(self.out_dim),
            device,
        );
        let identity_residual = self.residual && self.in_dim == width;
        let residual = (self.residual && !identity_residual).then(|| {
            LinearConfig::new(self.in_dim, width)
                .with_bias(false)
                .with_initializer(Initializer::XavierNormal { gain })
                .init(device)
        });
        GatV2Conv {
            fc,
            attn,
            residual,
            feat_drop: DropoutConfig::new(self.feat_drop).init(),
            attn_drop: DropoutConfig::new(self.attn_drop).init(),
            heads: self.heads,
            out_dim: self.out_dim,
            negative_slope: self.negative_slope,
            identity_residual,
            activation: self.activation,
        }
    }
}

#[derive(Module, Debug)]
pub struct GatV2Conv<B: Backend> {
    fc: nn::Linear<B>,
    /// Attention vector per head (shape: [heads, out_dim]).
    attn: Param<Tensor<B, 2>>,
    residual: Option<nn::Linear<B>>,
    feat_drop: Dropout,
    attn_drop: Dropout,
    heads: usize,
    out_dim: usize,
    negative_slope: f64,
    identity_residual: bool,
    activation: bool,
}

impl<B: Backend> GatV2Conv<B> {
    /// Returns per-head node outputs with shape [num_nodes, heads, out_dim].
    pub fn forward(&self, graph: &GraphTensors<B>, x: Tensor<B, 2>) -> Tensor<B, 3> {
        self.forward_with_attention(graph, x).0
    }

    /// Forward pass that also returns the normalized attention weights [num_edges, heads].
    pub fn forward_with_attention(
        &self,
        graph: &GraphTensors<B>,
        x: Tensor<B, 2>,
    ) -> (Tensor<B, 3>, Tensor<B, 2>) {
        let [n, _] = x.dims();
        let (heads, d) = (self.heads, self.out_dim);
        let edges = graph.num_edges();
        let device = x.device();

        let x = self.feat_drop.forward(x);
        let z = self.fc.forward(x.clone());

        let (aggregated, alpha) = if edges == 0 {
            (
                Tensor::<B, 2>::zeros([n, heads * d], &device),
                Tensor::<B, 2>::zeros([0, heads], &device),
            )
        } else {
            let z_src = z.clone().select(0, graph.src.clone());
            let z_dst = z.select(0, graph.dst.clone());
            let pair = leaky_relu(z_src.clone() + z_dst, self.negative_slope).reshape([
                edges, heads, d,
            ]);
            let scores = (pair * self.attn.val().unsqueeze_dim::<3>(0))
                .sum_dim(2)
                .reshape([edges, heads]);
            let alpha = edge_softmax(scores, graph);
            let alpha = self.attn_drop.forward(alpha);
            let messages = z_src.reshape([edges, heads, d]) * alpha.clone().unsqueeze_dim::<3>(2);
            let aggregated = Tensor::<B, 2>::zeros([n, heads * d], &device).select_assign(
                0,
                graph.dst.clone(),
                messages.reshape([edges, heads * d]),
            );
            (aggregated, alpha)
        };

        let mut out = aggregated;
        if self.identity_residual {
            out = out + x;
        } else if let Some(res) = &self.residual {
            out = out + res.forward(x);
        }
        if self.activation {
            out = elu(out);
        }
        (out.reshape([n, heads, d]), alpha)
    }
}

/// Softmax of per-edge scores over the incoming edges of each destination node.
///
/// The per-destination maximum is subtracted first; it is computed on the host and
/// carries no gradient, which leaves the softmax gradient unchanged. If the scores
/// cannot be read back, the per-head maximum over all edges is used instead.
pub fn edge_softmax<B: Backend>(scores: Tensor<B, 2>, graph: &GraphTensors<B>) -> Tensor<B, 2> {
    let [num_edges, heads] = scores.dims();
    let device = scores.device();
    let dst: Tensor<B, 1, Int> = graph.dst.clone();
    let shift = match scores.to_data().convert::<f32>().to_vec::<f32>() {
        Ok(host) => {
            let node_max = segment_max(&host, &graph.dst_host, graph.num_nodes, heads);
            Tensor::<B, 2>::from_data(
                TensorData::new(node_max, [graph.num_nodes, heads]).convert::<B::FloatElem>(),
                &device,
            )
            .select(0, dst.clone())
        }
        Err(err) => {
            tracing::warn!(
                ?err,
                "edge scores not readable on host; shifting by the per-head maximum"
            );
            scores.clone().detach().max_dim(0).repeat_dim(0, num_edges)
        }
    };
    let exp = (scores - shift).exp();
    let denom = Tensor::<B, 2>::zeros([graph.num_nodes, heads], &device).select_assign(
        0,
        dst.clone(),
        exp.clone(),
    );
    exp / denom.select(0, dst)
}

fn segment_max(scores: &[f32], dst: &[i64], num_nodes: usize, heads: usize) -> Vec<f32> {
    let mut max = vec![f32::NEG_INFINITY; num_nodes * heads];
    for (e, &node) in dst.iter().enumerate() {
        let node = node as usize;
        for h in 0..heads {
            let s = scores.get(e * heads + h).copied().unwrap_or(0.0);
            if let Some(slot) = max.get_mut(node * heads + h) {
                if s > *slot {
                    *slot = s;
                }
            }
        }
    }
    for m in max.iter_mut() {
        if !m.is_finite() {
            *m = 0.0;
        }
    }
    max
}

/// ELU with alpha = 1.
pub fn elu<B: Backend, const D: usize>(x: Tensor<B, D>) -> Tensor<B, D> {
    relu(x.clone()) + x.clamp_max(0.0).exp().sub_scalar(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_max_groups_by_destination() {
        // Edges: 0->1 (score 1,5), 2->1 (3,2), 0->2 (-4,-1); node 0 has no incoming edge.
        let scores = [1.0, 5.0, 3.0, 2.0, -4.0, -1.0];
        let max = segment_max(&scores, &[1, 1, 2], 3, 2);
        assert_eq!(max, vec![0.0, 0.0, 3.0, 5.0, -4.0, -1.0]);
    }
}

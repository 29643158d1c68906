//! Burn modules for link prediction on transaction graphs.
//!
//! This crate defines:
//! - `GatV2Conv`: one GATv2 attention layer (shared source/destination weights, no bias).
//! - `GatV2`: the multi-layer encoder producing per-node embeddings.
//! - `LinkProbe`: a linear scorer over concatenated source/destination embeddings.
//! - `LinkPredictor`: encoder and probe bundled as one trainable module.
//!
//! The modules know nothing about datasets or training; the `training` crate drives them.

pub mod conv;

use burn::module::Module;
use burn::nn;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use graph_data::GraphTensors;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use conv::{edge_softmax, elu, GatV2Conv, GatV2ConvConfig};

#[derive(Debug, Error, PartialEq)]
pub enum ModelConfigError {
    #[error("num_layers must be at least 1")]
    NoLayers,
    #[error("{heads} head counts given for {layers} attention layers")]
    TooFewHeads { heads: usize, layers: usize },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("{name} must be in [0, 1), got {value}")]
    DropoutRange { name: &'static str, value: f64 },
}

/// Encoder hyperparameters.
///
/// Layer `l < num_layers` uses `heads[l]` heads; the output layer uses the last entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatV2Config {
    pub num_layers: usize,
    pub in_dim: usize,
    pub num_hidden: usize,
    pub num_classes: usize,
    pub heads: Vec<usize>,
    pub feat_drop: f64,
    pub attn_drop: f64,
    pub negative_slope: f64,
    pub residual: bool,
}

impl Default for GatV2Config {
    fn default() -> Self {
        Self {
            num_layers: 3,
            in_dim: 16,
            num_hidden: 32,
            num_classes: 8,
            heads: vec![4, 4, 4],
            feat_drop: 0.0,
            attn_drop: 0.0,
            negative_slope: 0.2,
            residual: true,
        }
    }
}

impl GatV2Config {
    pub fn validate(&self) -> Result<(), ModelConfigError> {
        if self.num_layers == 0 {
            return Err(ModelConfigError::NoLayers);
        }
        if self.heads.len() < self.num_layers {
            return Err(ModelConfigError::TooFewHeads {
                heads: self.heads.len(),
                layers: self.num_layers,
            });
        }
        for (name, value) in [
            ("in_dim", self.in_dim),
            ("num_hidden", self.num_hidden),
            ("num_classes", self.num_classes),
        ] {
            if value == 0 {
                return Err(ModelConfigError::Zero(name));
            }
        }
        if self.heads.contains(&0) {
            return Err(ModelConfigError::Zero("heads"));
        }
        for (name, value) in [("feat_drop", self.feat_drop), ("attn_drop", self.attn_drop)] {
            if !(0.0..1.0).contains(&value) {
                return Err(ModelConfigError::DropoutRange { name, value });
            }
        }
        Ok(())
    }

    /// Width of one node embedding produced by the encoder.
    pub fn embedding_dim(&self) -> usize {
        self.num_classes
    }

    /// Per-layer configs, output layer last.
    pub fn layer_configs(&self) -> Vec<GatV2ConvConfig> {
        let mut layers = Vec::with_capacity(self.num_layers + 1);
        let mut in_dim = self.in_dim;
        for l in 0..self.num_layers {
            layers.push(GatV2ConvConfig {
                feat_drop: self.feat_drop,
                attn_drop: self.attn_drop,
                negative_slope: self.negative_slope,
                // The input projection never carries a residual.
                residual: l > 0 && self.residual,
                activation: true,
                ..GatV2ConvConfig::new(in_dim, self.num_hidden, self.heads[l])
            });
            in_dim = self.num_hidden * self.heads[l];
        }
        let out_heads = self.heads.last().copied().unwrap_or(1);
        layers.push(GatV2ConvConfig {
            feat_drop: self.feat_drop,
            attn_drop: self.attn_drop,
            negative_slope: self.negative_slope,
            residual: self.residual,
            activation: false,
            ..GatV2ConvConfig::new(in_dim, self.num_classes, out_heads)
        });
        layers
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<GatV2<B>, ModelConfigError> {
        self.validate()?;
        let mut configs = self.layer_configs();
        let output = configs.pop().ok_or(ModelConfigError::NoLayers)?.init(device);
        let hidden = configs.iter().map(|c| c.init(device)).collect();
        Ok(GatV2 { hidden, output })
    }
}

#[derive(Module, Debug)]
pub struct GatV2<B: Backend> {
    hidden: Vec<GatV2Conv<B>>,
    output: GatV2Conv<B>,
}

impl<B: Backend> GatV2<B> {
    /// Node embeddings with shape [num_nodes, num_classes]; output heads are averaged.
    pub fn forward(&self, graph: &GraphTensors<B>) -> Tensor<B, 2> {
        let mut h = graph.features.clone();
        for layer in &self.hidden {
            let out = layer.forward(graph, h);
            let [n, heads, d] = out.dims();
            h = out.reshape([n, heads * d]);
        }
        let out = self.output.forward(graph, h);
        let [n, _, d] = out.dims();
        out.mean_dim(1).reshape([n, d])
    }

    pub fn num_layers(&self) -> usize {
        self.hidden.len() + 1
    }
}

/// Linear scorer over `[h_src, h_dst]` edge embeddings, returning logits.
#[derive(Module, Debug)]
pub struct LinkProbe<B: Backend> {
    linear: nn::Linear<B>,
}

impl<B: Backend> LinkProbe<B> {
    pub fn new(embedding_dim: usize, device: &B::Device) -> Self {
        Self {
            linear: nn::LinearConfig::new(2 * embedding_dim, 1).init(device),
        }
    }

    /// Logits with shape [num_edges, 1].
    pub fn forward(&self, edge_embeddings: Tensor<B, 2>) -> Tensor<B, 2> {
        self.linear.forward(edge_embeddings)
    }
}

#[derive(Module, Debug)]
pub struct LinkPredictor<B: Backend> {
    pub encoder: GatV2<B>,
    pub probe: LinkProbe<B>,
}

impl<B: Backend> LinkPredictor<B> {
    pub fn new(cfg: &GatV2Config, device: &B::Device) -> Result<Self, ModelConfigError> {
        Ok(Self {
            encoder: cfg.init(device)?,
            probe: LinkProbe::new(cfg.embedding_dim(), device),
        })
    }

    pub fn embed(&self, graph: &GraphTensors<B>) -> Tensor<B, 2> {
        self.encoder.forward(graph)
    }

    pub fn score(&self, edge_embeddings: Tensor<B, 2>) -> Tensor<B, 2> {
        self.probe.forward(edge_embeddings)
    }
}

pub mod prelude {
    pub use super::{
        GatV2, GatV2Config, GatV2Conv, GatV2ConvConfig, LinkPredictor, LinkProbe,
        ModelConfigError,
    };
}

//! Transaction-graph loading and Burn tensor upload for GATv2 link prediction.
//!
//! This crate provides utilities for:
//! - Loading the node-feature graph and the six edge-index splits
//! - Validating node ids and feature shapes before training
//! - Uploading the graph and edge lists as Burn tensors

pub mod dataset;
pub mod edges;
pub mod graph;
pub mod tensors;
pub mod types;

pub use dataset::{DatasetPaths, LinkDataset};
pub use edges::{EdgeIndex, EdgeSplits};
pub use graph::TransactionGraph;
pub use tensors::{EdgeBatch, GraphTensors};
pub use types::*;

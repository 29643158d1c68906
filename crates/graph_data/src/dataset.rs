//! Fixed-layout dataset directory: one graph file plus six edge-index files.

use crate::edges::{EdgeIndex, EdgeSplits};
use crate::graph::TransactionGraph;
use crate::types::{GraphDataError, GraphDataResult, Polarity, SplitKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const GRAPH_FILE: &str = "graph.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetPaths {
    pub graph: PathBuf,
    pub positive_train: PathBuf,
    pub positive_validation: PathBuf,
    pub positive_test: PathBuf,
    pub negative_train: PathBuf,
    pub negative_validation: PathBuf,
    pub negative_test: PathBuf,
}

/// File name for one split, e.g. `positive_validation_edge_indices.json`.
pub fn split_file_name(split: SplitKind, polarity: Polarity) -> String {
    format!("{polarity}_{split}_edge_indices.json")
}

impl DatasetPaths {
    /// Default file names under a single data directory.
    pub fn in_dir(root: &Path) -> Self {
        let p = |split, polarity| root.join(split_file_name(split, polarity));
        Self {
            graph: root.join(GRAPH_FILE),
            positive_train: p(SplitKind::Train, Polarity::Positive),
            positive_validation: p(SplitKind::Validation, Polarity::Positive),
            positive_test: p(SplitKind::Test, Polarity::Positive),
            negative_train: p(SplitKind::Train, Polarity::Negative),
            negative_validation: p(SplitKind::Validation, Polarity::Negative),
            negative_test: p(SplitKind::Test, Polarity::Negative),
        }
    }

    pub fn split(&self, split: SplitKind, polarity: Polarity) -> &Path {
        match (split, polarity) {
            (SplitKind::Train, Polarity::Positive) => &self.positive_train,
            (SplitKind::Train, Polarity::Negative) => &self.negative_train,
            (SplitKind::Validation, Polarity::Positive) => &self.positive_validation,
            (SplitKind::Validation, Polarity::Negative) => &self.negative_validation,
            (SplitKind::Test, Polarity::Positive) => &self.positive_test,
            (SplitKind::Test, Polarity::Negative) => &self.negative_test,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LinkDataset {
    pub graph: TransactionGraph,
    pub splits: EdgeSplits,
}

impl LinkDataset {
    pub fn load(paths: &DatasetPaths) -> GraphDataResult<Self> {
        let graph = TransactionGraph::from_json_path(&paths.graph)?;
        let mut splits = EdgeSplits::default();
        for split in SplitKind::ALL {
            for polarity in [Polarity::Positive, Polarity::Negative] {
                let path = paths.split(split, polarity);
                let edges = EdgeIndex::from_json_path(path)?;
                tracing::debug!(%split, %polarity, edges = edges.len(), "loaded {}", path.display());
                *splits.get_mut(split, polarity) = edges;
            }
        }
        let dataset = Self { graph, splits };
        dataset.validate(paths)?;
        tracing::info!(
            nodes = dataset.graph.num_nodes,
            edges = dataset.graph.num_edges(),
            feature_dim = dataset.graph.feature_dim,
            train = dataset.splits.train_pos.len() + dataset.splits.train_neg.len(),
            validation = dataset.splits.val_pos.len() + dataset.splits.val_neg.len(),
            test = dataset.splits.test_pos.len() + dataset.splits.test_neg.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    /// Check split endpoints against the graph and require non-empty splits.
    pub fn validate(&self, paths: &DatasetPaths) -> GraphDataResult<()> {
        for split in SplitKind::ALL {
            for polarity in [Polarity::Positive, Polarity::Negative] {
                let edges = self.splits.get(split, polarity);
                let path = paths.split(split, polarity);
                if edges.is_empty() {
                    return Err(GraphDataError::invalid(
                        path,
                        format!("{polarity} {split} edge list is empty"),
                    ));
                }
                if let Some(bad) = edges.out_of_range(self.graph.num_nodes) {
                    return Err(GraphDataError::invalid(
                        path,
                        format!(
                            "node id {bad} out of range for graph with {} nodes",
                            self.graph.num_nodes
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Write the dataset in the layout `DatasetPaths::in_dir` expects.
    pub fn write_dir(&self, root: &Path) -> GraphDataResult<DatasetPaths> {
        fs::create_dir_all(root).map_err(|source| GraphDataError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        let paths = DatasetPaths::in_dir(root);
        self.graph.write_json(&paths.graph)?;
        for split in SplitKind::ALL {
            for polarity in [Polarity::Positive, Polarity::Negative] {
                self.splits
                    .get(split, polarity)
                    .write_json(paths.split(split, polarity))?;
            }
        }
        Ok(paths)
    }
}

//! Node-feature graph with a directed edge list.

use crate::types::{GraphDataError, GraphDataResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// On-disk layout: one feature row per node, edges as parallel `src`/`dst` lists.
#[derive(Debug, Deserialize, Serialize)]
struct GraphFile {
    num_nodes: usize,
    src: Vec<i64>,
    dst: Vec<i64>,
    features: Vec<Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionGraph {
    pub num_nodes: usize,
    pub feature_dim: usize,
    /// Edge sources; messages flow `src -> dst`.
    pub src: Vec<i64>,
    pub dst: Vec<i64>,
    /// Row-major node features (`num_nodes * feature_dim`).
    pub features: Vec<f32>,
}

impl TransactionGraph {
    /// Build from feature rows, checking shapes and edge endpoints.
    pub fn from_rows(
        src: Vec<i64>,
        dst: Vec<i64>,
        rows: Vec<Vec<f32>>,
    ) -> Result<Self, String> {
        let num_nodes = rows.len();
        let feature_dim = rows.first().map(|r| r.len()).unwrap_or(0);
        if num_nodes == 0 {
            return Err("graph has no nodes".into());
        }
        if feature_dim == 0 {
            return Err("node features are empty".into());
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != feature_dim) {
            return Err(format!(
                "feature row {i} has length {}, expected {feature_dim}",
                row.len()
            ));
        }
        let graph = Self {
            num_nodes,
            feature_dim,
            src,
            dst,
            features: rows.into_iter().flatten().collect(),
        };
        graph.check_edges()?;
        Ok(graph)
    }

    pub fn from_json_path(path: &Path) -> GraphDataResult<Self> {
        let raw = fs::read(path).map_err(|source| GraphDataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: GraphFile =
            serde_json::from_slice(&raw).map_err(|source| GraphDataError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        if file.features.len() != file.num_nodes {
            return Err(GraphDataError::invalid(
                path,
                format!(
                    "num_nodes is {} but {} feature rows were given",
                    file.num_nodes,
                    file.features.len()
                ),
            ));
        }
        let graph = Self::from_rows(file.src, file.dst, file.features)
            .map_err(|msg| GraphDataError::invalid(path, msg))?;
        tracing::debug!(
            nodes = graph.num_nodes,
            edges = graph.num_edges(),
            feature_dim = graph.feature_dim,
            "loaded graph from {}",
            path.display()
        );
        for i in 0..graph.num_nodes.min(5) {
            tracing::debug!("features[{i}] = {:?}", graph.feature_row(i));
        }
        Ok(graph)
    }

    pub fn write_json(&self, path: &Path) -> GraphDataResult<()> {
        let file = GraphFile {
            num_nodes: self.num_nodes,
            src: self.src.clone(),
            dst: self.dst.clone(),
            features: self
                .features
                .chunks(self.feature_dim.max(1))
                .map(|r| r.to_vec())
                .collect(),
        };
        let json = serde_json::to_vec(&file).map_err(|source| GraphDataError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| GraphDataError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn num_edges(&self) -> usize {
        self.src.len()
    }

    pub fn feature_row(&self, node: usize) -> &[f32] {
        let start = node * self.feature_dim;
        &self.features[start..start + self.feature_dim]
    }

    /// Append an `i -> i` edge for every node.
    pub fn add_self_loops(&mut self) {
        for i in 0..self.num_nodes as i64 {
            self.src.push(i);
            self.dst.push(i);
        }
    }

    /// Number of nodes with no incoming edge.
    pub fn zero_in_degree_count(&self) -> usize {
        let mut seen = vec![false; self.num_nodes];
        for &d in &self.dst {
            if let Some(slot) = seen.get_mut(d as usize) {
                *slot = true;
            }
        }
        seen.iter().filter(|s| !**s).count()
    }

    fn check_edges(&self) -> Result<(), String> {
        if self.src.len() != self.dst.len() {
            return Err(format!(
                "edge lists differ in length: src={} dst={}",
                self.src.len(),
                self.dst.len()
            ));
        }
        let n = self.num_nodes as i64;
        if let Some(bad) = self
            .src
            .iter()
            .chain(self.dst.iter())
            .find(|&&v| v < 0 || v >= n)
        {
            return Err(format!("edge endpoint {bad} out of range for {n} nodes"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_ragged_rows() {
        let err = TransactionGraph::from_rows(vec![], vec![], vec![vec![1.0, 2.0], vec![3.0]])
            .unwrap_err();
        assert!(err.contains("row 1"));
    }

    #[test]
    fn rejects_out_of_range_edges() {
        let err = TransactionGraph::from_rows(vec![0], vec![2], vec![vec![0.0], vec![1.0]])
            .unwrap_err();
        assert!(err.contains("out of range"));
    }

    #[test]
    fn self_loops_cover_isolated_nodes() {
        let mut g =
            TransactionGraph::from_rows(vec![0], vec![1], vec![vec![0.0], vec![1.0], vec![2.0]])
                .unwrap();
        assert_eq!(g.zero_in_degree_count(), 2);
        g.add_self_loops();
        assert_eq!(g.num_edges(), 4);
        assert_eq!(g.zero_in_degree_count(), 0);
    }
}

//! Edge-index lists and the six positive/negative splits.

use crate::types::{GraphDataError, GraphDataResult, Polarity, SplitKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A 2×E edge list, serialized as `[[s0, s1, ...], [d0, d1, ...]]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<i64>>", into = "Vec<Vec<i64>>")]
pub struct EdgeIndex {
    pub src: Vec<i64>,
    pub dst: Vec<i64>,
}

impl TryFrom<Vec<Vec<i64>>> for EdgeIndex {
    type Error = String;

    fn try_from(rows: Vec<Vec<i64>>) -> Result<Self, Self::Error> {
        let [src, dst]: [Vec<i64>; 2] = rows
            .try_into()
            .map_err(|rows: Vec<Vec<i64>>| format!("expected 2 rows, got {}", rows.len()))?;
        Self::new(src, dst)
    }
}

impl From<EdgeIndex> for Vec<Vec<i64>> {
    fn from(edges: EdgeIndex) -> Self {
        vec![edges.src, edges.dst]
    }
}

impl EdgeIndex {
    pub fn new(src: Vec<i64>, dst: Vec<i64>) -> Result<Self, String> {
        if src.len() != dst.len() {
            return Err(format!(
                "source row has {} entries, destination row has {}",
                src.len(),
                dst.len()
            ));
        }
        Ok(Self { src, dst })
    }

    pub fn from_pairs(pairs: &[(i64, i64)]) -> Self {
        Self {
            src: pairs.iter().map(|p| p.0).collect(),
            dst: pairs.iter().map(|p| p.1).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.src.len()
    }

    pub fn is_empty(&self) -> bool {
        self.src.is_empty()
    }

    pub fn from_json_path(path: &Path) -> GraphDataResult<Self> {
        let raw = fs::read(path).map_err(|source| GraphDataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&raw).map_err(|source| GraphDataError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn write_json(&self, path: &Path) -> GraphDataResult<()> {
        let json = serde_json::to_vec(self).map_err(|source| GraphDataError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| GraphDataError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// First endpoint outside `[0, num_nodes)`, if any.
    pub fn out_of_range(&self, num_nodes: usize) -> Option<i64> {
        let n = num_nodes as i64;
        self.src
            .iter()
            .chain(self.dst.iter())
            .copied()
            .find(|&v| v < 0 || v >= n)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeSplits {
    pub train_pos: EdgeIndex,
    pub train_neg: EdgeIndex,
    pub val_pos: EdgeIndex,
    pub val_neg: EdgeIndex,
    pub test_pos: EdgeIndex,
    pub test_neg: EdgeIndex,
}

impl EdgeSplits {
    pub fn get(&self, split: SplitKind, polarity: Polarity) -> &EdgeIndex {
        match (split, polarity) {
            (SplitKind::Train, Polarity::Positive) => &self.train_pos,
            (SplitKind::Train, Polarity::Negative) => &self.train_neg,
            (SplitKind::Validation, Polarity::Positive) => &self.val_pos,
            (SplitKind::Validation, Polarity::Negative) => &self.val_neg,
            (SplitKind::Test, Polarity::Positive) => &self.test_pos,
            (SplitKind::Test, Polarity::Negative) => &self.test_neg,
        }
    }

    pub fn get_mut(&mut self, split: SplitKind, polarity: Polarity) -> &mut EdgeIndex {
        match (split, polarity) {
            (SplitKind::Train, Polarity::Positive) => &mut self.train_pos,
            (SplitKind::Train, Polarity::Negative) => &mut self.train_neg,
            (SplitKind::Validation, Polarity::Positive) => &mut self.val_pos,
            (SplitKind::Validation, Polarity::Negative) => &mut self.val_neg,
            (SplitKind::Test, Polarity::Positive) => &mut self.test_pos,
            (SplitKind::Test, Polarity::Negative) => &mut self.test_neg,
        }
    }

    /// Positive and negative lists of one split.
    pub fn pair(&self, split: SplitKind) -> (&EdgeIndex, &EdgeIndex) {
        (
            self.get(split, Polarity::Positive),
            self.get(split, Polarity::Negative),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_row_edge_index() {
        let edges: EdgeIndex = serde_json::from_str("[[0, 1, 2], [3, 4, 5]]").unwrap();
        assert_eq!(edges.src, vec![0, 1, 2]);
        assert_eq!(edges.dst, vec![3, 4, 5]);
        assert_eq!(serde_json::to_string(&edges).unwrap(), "[[0,1,2],[3,4,5]]");
    }

    #[test]
    fn rejects_mismatched_rows() {
        assert!(serde_json::from_str::<EdgeIndex>("[[0, 1], [3]]").is_err());
        assert!(serde_json::from_str::<EdgeIndex>("[[0, 1]]").is_err());
    }

    #[test]
    fn reports_out_of_range_endpoint() {
        let edges = EdgeIndex::from_pairs(&[(0, 1), (1, 7)]);
        assert_eq!(edges.out_of_range(5), Some(7));
        assert_eq!(edges.out_of_range(8), None);
    }
}

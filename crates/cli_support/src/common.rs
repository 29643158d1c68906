use clap::{Args, ValueEnum};
use graph_data::DatasetPaths;
use std::path::PathBuf;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    NdArray,
    Wgpu,
}

/// Dataset location shared by train/eval.
#[derive(Debug, Clone, Default, Args)]
pub struct DataArgs {
    /// Directory holding graph.json and the six *_edge_indices.json files (default: data).
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Override the graph file path.
    #[arg(long)]
    pub graph: Option<PathBuf>,
    /// Add an i -> i edge for every node before training.
    #[arg(long)]
    pub self_loops: Option<bool>,
}

/// Per-file overrides on top of a data directory.
#[derive(Debug, Clone, Default)]
pub struct DataPathOverrides {
    pub graph: Option<PathBuf>,
    pub positive_train: Option<PathBuf>,
    pub positive_validation: Option<PathBuf>,
    pub positive_test: Option<PathBuf>,
    pub negative_train: Option<PathBuf>,
    pub negative_validation: Option<PathBuf>,
    pub negative_test: Option<PathBuf>,
}

impl DataPathOverrides {
    /// Start from the default layout under `root`, then apply overrides.
    pub fn resolve(&self, root: &std::path::Path) -> DatasetPaths {
        let base = DatasetPaths::in_dir(root);
        let pick = |o: &Option<PathBuf>, d: PathBuf| o.clone().unwrap_or(d);
        DatasetPaths {
            graph: pick(&self.graph, base.graph),
            positive_train: pick(&self.positive_train, base.positive_train),
            positive_validation: pick(&self.positive_validation, base.positive_validation),
            positive_test: pick(&self.positive_test, base.positive_test),
            negative_train: pick(&self.negative_train, base.negative_train),
            negative_validation: pick(&self.negative_validation, base.negative_validation),
            negative_test: pick(&self.negative_test, base.negative_test),
        }
    }
}

/// Reject backends the binary was not built with.
pub fn validate_backend_choice(kind: BackendKind) -> Result<(), String> {
    let built_wgpu = cfg!(feature = "backend-wgpu");
    match (kind, built_wgpu) {
        (BackendKind::Wgpu, false) => Err(
            "backend-wgpu feature not enabled; rebuild with --features backend-wgpu or choose ndarray backend"
                .to_string(),
        ),
        (BackendKind::NdArray, true) => {
            tracing::warn!(
                "built with backend-wgpu; training will still use the WGPU backend despite --backend nd-array"
            );
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn overrides_replace_single_files() {
        let overrides = DataPathOverrides {
            negative_test: Some(PathBuf::from("/elsewhere/neg.json")),
            ..Default::default()
        };
        let paths = overrides.resolve(Path::new("data"));
        assert_eq!(paths.negative_test, PathBuf::from("/elsewhere/neg.json"));
        assert_eq!(paths.graph, PathBuf::from("data/graph.json"));
    }

    #[test]
    fn wgpu_requires_feature() {
        if !cfg!(feature = "backend-wgpu") {
            assert!(validate_backend_choice(BackendKind::Wgpu).is_err());
        }
        assert!(validate_backend_choice(BackendKind::NdArray).is_ok());
    }
}

//! CLI arguments and their merge with the optional config file.

use clap::Parser;
use cli_support::{BackendKind, ConfigFile, DataArgs};
use graph_data::DatasetPaths;
use models::GatV2Config;
use std::path::PathBuf;

use crate::trainer::TrainConfig;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_RESULT_PATH: &str = "result.txt";
pub const DEFAULT_RUNS: usize = 5;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "train",
    about = "Train a GATv2 link predictor with early stopping and report test metrics"
)]
pub struct TrainArgs {
    /// TOML config file (default: $GAT_LINK_CONFIG or ./gat-link.toml when present).
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[command(flatten)]
    pub data: DataArgs,
    /// Backend to use (ndarray or wgpu if enabled).
    #[arg(long, value_enum, default_value_t = BackendKind::NdArray)]
    pub backend: BackendKind,
    /// Maximum epochs per run (default: 200).
    #[arg(long)]
    pub epochs: Option<usize>,
    /// Epochs without validation improvement before stopping (default: 20).
    #[arg(long)]
    pub patience: Option<usize>,
    /// Adam learning rate (default: 1e-3).
    #[arg(long)]
    pub lr: Option<f64>,
    /// Independent train/evaluate repetitions (default: 5).
    #[arg(long)]
    pub runs: Option<usize>,
    /// Base seed; run i uses seed + i (falls back to $GAT_LINK_SEED).
    #[arg(long)]
    pub seed: Option<u64>,
    /// Only optimize the encoder; the link probe keeps its initial weights (default: false).
    #[arg(long)]
    pub freeze_probe: Option<bool>,
    /// Result file receiving one metrics line per run (default: result.txt).
    #[arg(long)]
    pub result_path: Option<PathBuf>,
    /// Optional JSONL file for per-epoch losses and per-run test metrics.
    #[arg(long)]
    pub metrics_out: Option<PathBuf>,
    /// Save each run's best model under this directory.
    #[arg(long)]
    pub checkpoint_dir: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "eval",
    about = "Evaluate a saved link-predictor checkpoint on the test edges"
)]
pub struct EvalArgs {
    /// TOML config file (data section only is used).
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[command(flatten)]
    pub data: DataArgs,
    /// Backend to use (ndarray or wgpu if enabled).
    #[arg(long, value_enum, default_value_t = BackendKind::NdArray)]
    pub backend: BackendKind,
    /// Checkpoint written by `train --checkpoint-dir`.
    #[arg(long)]
    pub checkpoint: PathBuf,
    /// Append the metrics line to this file as well.
    #[arg(long)]
    pub result_path: Option<PathBuf>,
}

/// Fully resolved experiment settings.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub data: DatasetPaths,
    pub self_loops: bool,
    /// `None` when neither the CLI nor the config file set the encoder; the
    /// driver then uses the defaults with `in_dim` taken from the graph.
    pub model: Option<GatV2Config>,
    pub train: TrainConfig,
    pub runs: usize,
    pub seed: Option<u64>,
    pub result_path: PathBuf,
    pub checkpoint_dir: Option<PathBuf>,
}

/// Data paths from CLI flags over the config file's `[data]` section.
pub fn resolve_data(args: &DataArgs, file: &ConfigFile) -> (DatasetPaths, bool) {
    let dir = args
        .data_dir
        .clone()
        .or_else(|| file.data.dir())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    let mut overrides = file.data.overrides();
    if args.graph.is_some() {
        overrides.graph = args.graph.clone();
    }
    let self_loops = args.self_loops.or(file.data.self_loops).unwrap_or(false);
    (overrides.resolve(&dir), self_loops)
}

impl RunSettings {
    /// CLI flags win over the config file, which wins over built-in defaults.
    pub fn resolve(args: &TrainArgs, file: &ConfigFile) -> Self {
        let defaults = TrainConfig::default();
        let t = &file.train;
        let (data, self_loops) = resolve_data(&args.data, file);
        let train = TrainConfig {
            epochs: args.epochs.or(t.epochs).unwrap_or(defaults.epochs),
            patience: args.patience.or(t.patience).unwrap_or(defaults.patience),
            lr: args.lr.or(t.lr).unwrap_or(defaults.lr),
            freeze_probe: args
                .freeze_probe
                .or(t.freeze_probe)
                .unwrap_or(defaults.freeze_probe),
            metrics_out: args.metrics_out.clone().or_else(|| t.metrics_out()),
        };
        Self {
            data,
            self_loops,
            model: file.model.clone(),
            train,
            runs: args.runs.or(t.runs).unwrap_or(DEFAULT_RUNS),
            seed: cli_support::resolve_seed(args.seed.or(t.seed)),
            result_path: args
                .result_path
                .clone()
                .or_else(|| t.result_path())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULT_PATH)),
            checkpoint_dir: args.checkpoint_dir.clone().or_else(|| t.checkpoint_dir()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> TrainArgs {
        TrainArgs::parse_from(std::iter::once("train").chain(argv.iter().copied()))
    }

    #[test]
    fn defaults_follow_reference_experiment() {
        let s = RunSettings::resolve(&parse(&[]), &ConfigFile::default());
        assert_eq!(s.train.epochs, 200);
        assert_eq!(s.train.patience, 20);
        assert_eq!(s.train.lr, 1e-3);
        assert_eq!(s.runs, 5);
        assert!(!s.train.freeze_probe);
        assert_eq!(s.result_path, PathBuf::from("result.txt"));
        assert_eq!(s.data.graph, PathBuf::from("data/graph.json"));
        assert!(s.model.is_none());
    }

    #[test]
    fn cli_overrides_config_file() {
        let file: ConfigFile = toml::from_str(
            "[data]\ndir = \"cfgdata\"\n[train]\nepochs = 10\npatience = 3\n",
        )
        .unwrap();
        let s = RunSettings::resolve(&parse(&["--epochs", "4", "--data-dir", "clidata"]), &file);
        assert_eq!(s.train.epochs, 4);
        assert_eq!(s.train.patience, 3);
        assert_eq!(
            s.data.positive_test,
            PathBuf::from("clidata/positive_test_edge_indices.json")
        );
    }

    #[test]
    fn freeze_probe_flag_overrides_config_either_way() {
        let file: ConfigFile = toml::from_str("[train]\nfreeze_probe = true\n").unwrap();
        assert!(RunSettings::resolve(&parse(&[]), &file).train.freeze_probe);
        let off = parse(&["--freeze-probe", "false"]);
        assert!(!RunSettings::resolve(&off, &file).train.freeze_probe);
        let on = parse(&["--freeze-probe", "true"]);
        assert!(RunSettings::resolve(&on, &ConfigFile::default()).train.freeze_probe);
    }
}

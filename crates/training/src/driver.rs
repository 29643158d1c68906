//! Repeated train/evaluate runs and the `train` binary entry point.

use burn::module::AutodiffModule;
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::backend::Autodiff;
use cli_support::ConfigFile;
use graph_data::{LinkDataset, SplitKind};
use models::{GatV2Config, LinkPredictor};
use std::path::PathBuf;

use crate::checkpoint::{save_checkpoint, CheckpointMeta};
use crate::edges::LinkTensors;
use crate::evaluate::evaluate_split;
use crate::metrics::{append_result, mean_std, LinkMetrics};
use crate::metrics_log::MetricsLog;
use crate::settings::{RunSettings, TrainArgs};
use crate::trainer::train_link_predictor_logged;
use crate::TrainBackend;

#[derive(Debug, Clone)]
pub struct RunReport {
    pub run: usize,
    pub metrics: LinkMetrics,
    pub best_epoch: Option<usize>,
    pub best_val_loss: f32,
    pub epochs_run: usize,
    pub stopped_early: bool,
    pub checkpoint: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub runs: usize,
    pub mean: LinkMetrics,
    pub std: LinkMetrics,
}

impl RunSummary {
    pub fn from_reports(reports: &[RunReport]) -> Option<Self> {
        let metrics: Vec<LinkMetrics> = reports.iter().map(|r| r.metrics).collect();
        mean_std(&metrics).map(|(mean, std)| RunSummary {
            runs: reports.len(),
            mean,
            std,
        })
    }
}

/// Encoder config for a dataset; `in_dim` must match the node feature width.
pub fn model_config_for(
    settings: &RunSettings,
    dataset: &LinkDataset,
) -> anyhow::Result<GatV2Config> {
    let feature_dim = dataset.graph.feature_dim;
    match &settings.model {
        Some(cfg) if cfg.in_dim != feature_dim => anyhow::bail!(
            "model in_dim is {} but graph features have width {feature_dim}",
            cfg.in_dim
        ),
        Some(cfg) => Ok(cfg.clone()),
        None => Ok(GatV2Config {
            in_dim: feature_dim,
            ..Default::default()
        }),
    }
}

/// Train and evaluate `settings.runs` fresh models, appending each run's metrics.
pub fn run_experiment<B: AutodiffBackend>(
    dataset: &LinkDataset,
    settings: &RunSettings,
    device: &B::Device,
) -> anyhow::Result<Vec<RunReport>> {
    let model_cfg = model_config_for(settings, dataset)?;
    model_cfg.validate()?;
    if settings.runs == 0 {
        anyhow::bail!("runs must be at least 1");
    }

    let mut dataset = dataset.clone();
    if settings.self_loops {
        dataset.graph.add_self_loops();
    }
    let isolated = dataset.graph.zero_in_degree_count();
    if isolated > 0 {
        tracing::warn!(
            isolated,
            "nodes without incoming edges only see their residual path; consider --self-loops true"
        );
    }

    // Opened before the first run so an unwritable path fails before any training.
    let mut metrics_log = settings
        .train
        .metrics_out
        .as_deref()
        .map(MetricsLog::open)
        .transpose()?;

    let train_data = LinkTensors::<B>::from_dataset(&dataset, device);
    let eval_data = LinkTensors::<B::InnerBackend>::from_dataset(&dataset, device);

    let mut reports = Vec::with_capacity(settings.runs);
    for run in 0..settings.runs {
        if let Some(seed) = settings.seed {
            B::seed(seed.wrapping_add(run as u64));
        }
        let model = LinkPredictor::<B>::new(&model_cfg, device)?;
        let outcome = train_link_predictor_logged(
            model,
            &train_data,
            &eval_data,
            &settings.train,
            run,
            metrics_log.as_mut(),
        )?;
        let best = outcome.best_model.valid();
        let metrics = evaluate_split(&best, &eval_data, SplitKind::Test)?;

        tracing::info!(
            run,
            auc = metrics.auc,
            f1 = metrics.f1,
            precision = metrics.precision,
            recall = metrics.recall,
            accuracy = metrics.accuracy,
            best_epoch = ?outcome.best_epoch,
            epochs_run = outcome.epochs_run,
            "test metrics"
        );
        append_result(&settings.result_path, &metrics).map_err(|e| {
            anyhow::anyhow!(
                "failed to append results to {}: {e}",
                settings.result_path.display()
            )
        })?;
        if let Some(log) = metrics_log.as_mut() {
            log.test(run, &metrics)?;
        }

        let checkpoint = match &settings.checkpoint_dir {
            Some(dir) => {
                let meta = CheckpointMeta {
                    model: model_cfg.clone(),
                    run,
                    best_epoch: outcome.best_epoch,
                    best_val_loss: outcome.best_val_loss,
                    self_loops: settings.self_loops,
                };
                let path = save_checkpoint(dir, &best, &meta)?;
                tracing::info!(run, "saved checkpoint to {}", path.display());
                Some(path)
            }
            None => None,
        };

        reports.push(RunReport {
            run,
            metrics,
            best_epoch: outcome.best_epoch,
            best_val_loss: outcome.best_val_loss,
            epochs_run: outcome.epochs_run,
            stopped_early: outcome.stopped_early,
            checkpoint,
        });
    }

    if let Some(summary) = RunSummary::from_reports(&reports) {
        let (m, s) = (summary.mean, summary.std);
        tracing::info!(
            runs = summary.runs,
            "mean over runs: AUC {:.4} ± {:.4}, F1 {:.4} ± {:.4}, Precision {:.4} ± {:.4}, Recall {:.4} ± {:.4}, Accuracy {:.4} ± {:.4}",
            m.auc, s.auc, m.f1, s.f1, m.precision, s.precision, m.recall, s.recall, m.accuracy, s.accuracy
        );
    }
    Ok(reports)
}

pub fn run_train(args: TrainArgs) -> anyhow::Result<Vec<RunReport>> {
    cli_support::validate_backend_choice(args.backend).map_err(|e| anyhow::anyhow!(e))?;
    let file = ConfigFile::load(args.config.as_deref())?;
    let settings = RunSettings::resolve(&args, &file);
    tracing::info!(
        graph = %settings.data.graph.display(),
        runs = settings.runs,
        epochs = settings.train.epochs,
        patience = settings.train.patience,
        lr = settings.train.lr,
        freeze_probe = settings.train.freeze_probe,
        seed = ?settings.seed,
        "starting link-prediction experiment"
    );

    let dataset = LinkDataset::load(&settings.data)?;
    let device = <TrainBackend as Backend>::Device::default();
    run_experiment::<Autodiff<TrainBackend>>(&dataset, &settings, &device)
}

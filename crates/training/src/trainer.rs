//! Full-graph training loop with validation-loss early stopping.

use burn::module::{AutodiffModule, Module};
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::{AutodiffBackend, Backend};
use graph_data::SplitKind;
use models::LinkPredictor;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::edges::{labelled_edges, LinkTensors};
use crate::loss::bce_with_logits;
use crate::metrics_log::MetricsLog;
use crate::scalar;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub epochs: usize,
    pub patience: usize,
    pub lr: f64,
    /// Keep the link probe at its initial weights; only the encoder is optimized.
    pub freeze_probe: bool,
    /// Optional JSONL file receiving one line per epoch.
    pub metrics_out: Option<PathBuf>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 200,
            patience: 20,
            lr: 1e-3,
            freeze_probe: false,
            metrics_out: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopDecision {
    Improved,
    NoImprovement,
    Stop,
}

/// Tracks the best validation loss and counts epochs without strict improvement.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    best: f32,
    best_epoch: Option<usize>,
    counter: usize,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self {
            patience,
            best: f32::INFINITY,
            best_epoch: None,
            counter: 0,
        }
    }

    pub fn observe(&mut self, epoch: usize, val_loss: f32) -> StopDecision {
        if val_loss < self.best {
            self.best = val_loss;
            self.best_epoch = Some(epoch);
            self.counter = 0;
            return StopDecision::Improved;
        }
        self.counter += 1;
        if self.counter >= self.patience {
            StopDecision::Stop
        } else {
            StopDecision::NoImprovement
        }
    }

    pub fn best(&self) -> f32 {
        self.best
    }

    pub fn best_epoch(&self) -> Option<usize> {
        self.best_epoch
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    pub epoch: usize,
    pub train_loss: f32,
    pub val_loss: f32,
    pub improved: bool,
}

#[derive(Debug, Clone)]
pub struct TrainOutcome<B: AutodiffBackend> {
    /// Snapshot taken at the epoch with the lowest validation loss.
    pub best_model: LinkPredictor<B>,
    pub best_val_loss: f32,
    pub best_epoch: Option<usize>,
    pub epochs_run: usize,
    pub stopped_early: bool,
    pub history: Vec<EpochRecord>,
}

/// Validation loss on the inner (non-autodiff) backend.
pub fn split_loss<B: Backend>(
    model: &LinkPredictor<B>,
    data: &LinkTensors<B>,
    split: SplitKind,
) -> anyhow::Result<f32> {
    let (pos, neg) = data.pair(split);
    let h = model.embed(&data.graph);
    let (emb, labels) = labelled_edges(h, pos, neg);
    scalar(bce_with_logits(model.score(emb), labels))
}

/// Train one model, opening `cfg.metrics_out` (when set) before the first epoch.
pub fn train_link_predictor<B: AutodiffBackend>(
    model: LinkPredictor<B>,
    train_data: &LinkTensors<B>,
    val_data: &LinkTensors<B::InnerBackend>,
    cfg: &TrainConfig,
    run: usize,
) -> anyhow::Result<TrainOutcome<B>> {
    let mut log = cfg.metrics_out.as_deref().map(MetricsLog::open).transpose()?;
    train_link_predictor_logged(model, train_data, val_data, cfg, run, log.as_mut())
}

/// Like [`train_link_predictor`], writing epoch lines to an already open log.
/// `cfg.metrics_out` is ignored.
pub fn train_link_predictor_logged<B: AutodiffBackend>(
    mut model: LinkPredictor<B>,
    train_data: &LinkTensors<B>,
    val_data: &LinkTensors<B::InnerBackend>,
    cfg: &TrainConfig,
    run: usize,
    mut log: Option<&mut MetricsLog>,
) -> anyhow::Result<TrainOutcome<B>> {
    if cfg.epochs == 0 {
        anyhow::bail!("epochs must be at least 1");
    }
    if cfg.freeze_probe {
        model = LinkPredictor {
            probe: model.probe.no_grad(),
            encoder: model.encoder,
        };
    }
    let mut optim = AdamConfig::new()
        .with_epsilon(1e-8)
        .init::<B, LinkPredictor<B>>();
    let mut stopper = EarlyStopping::new(cfg.patience);
    let mut best_model: Option<LinkPredictor<B>> = None;
    let mut history = Vec::with_capacity(cfg.epochs);
    let mut stopped_early = false;

    let (train_pos, train_neg) = train_data.pair(SplitKind::Train);
    for epoch in 0..cfg.epochs {
        let h = model.embed(&train_data.graph);
        let (emb, labels) = labelled_edges(h, train_pos, train_neg);
        let loss = bce_with_logits(model.score(emb), labels);
        let train_loss = scalar(loss.clone().detach())?;
        let grads = GradientsParams::from_grads(loss.backward(), &model);
        model = optim.step(cfg.lr, model, grads);

        let val_loss = split_loss(&model.valid(), val_data, SplitKind::Validation)?;
        tracing::info!(run, epoch, train_loss, val_loss, "epoch complete");

        let decision = stopper.observe(epoch, val_loss);
        let record = EpochRecord {
            epoch,
            train_loss,
            val_loss,
            improved: decision == StopDecision::Improved,
        };
        if let Some(log) = log.as_deref_mut() {
            log.epoch(run, &record)?;
        }
        history.push(record);

        match decision {
            StopDecision::Improved => best_model = Some(model.clone()),
            StopDecision::NoImprovement => {}
            StopDecision::Stop => {
                tracing::info!(
                    run,
                    epoch,
                    best_val_loss = stopper.best(),
                    "Early Stopping! no validation improvement for {} epochs",
                    cfg.patience
                );
                stopped_early = true;
                break;
            }
        }
    }

    let epochs_run = history.len();
    let best_model = match best_model {
        Some(m) => m,
        None => {
            tracing::warn!(run, "validation loss never improved; keeping the final model");
            model
        }
    };
    Ok(TrainOutcome {
        best_model,
        best_val_loss: stopper.best(),
        best_epoch: stopper.best_epoch(),
        epochs_run,
        stopped_early,
        history,
    })
}

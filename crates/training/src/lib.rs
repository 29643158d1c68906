#![recursion_limit = "256"]

pub mod checkpoint;
pub mod driver;
pub mod edges;
pub mod evaluate;
pub mod loss;
pub mod metrics;
pub mod metrics_log;
pub mod settings;
pub mod trainer;

pub use checkpoint::{load_checkpoint, save_checkpoint, CheckpointMeta};
pub use driver::{run_experiment, run_train, RunReport, RunSummary};
pub use edges::{edge_embeddings, labelled_edges, LinkTensors};
pub use evaluate::evaluate_split;
pub use loss::bce_with_logits;
pub use metrics::{append_result, link_metrics, roc_auc, LinkMetrics, MetricsError};
pub use metrics_log::MetricsLog;
pub use models::{GatV2, GatV2Config, LinkPredictor, LinkProbe};
pub use settings::{EvalArgs, RunSettings, TrainArgs};
pub use trainer::{
    train_link_predictor, train_link_predictor_logged, EarlyStopping, EpochRecord, StopDecision,
    TrainConfig, TrainOutcome,
};

/// Backend alias for training/eval (NdArray by default; WGPU if enabled).
#[cfg(feature = "backend-wgpu")]
pub type TrainBackend = burn::backend::Wgpu<f32, i32>;
#[cfg(not(feature = "backend-wgpu"))]
pub type TrainBackend = burn::backend::NdArray<f32>;

pub(crate) fn scalar<B: burn::tensor::backend::Backend, const D: usize>(
    tensor: burn::tensor::Tensor<B, D>,
) -> anyhow::Result<f32> {
    let values = tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| anyhow::anyhow!("failed to read tensor back to host: {e:?}"))?;
    values
        .first()
        .copied()
        .ok_or_else(|| anyhow::anyhow!("expected a scalar tensor, got no elements"))
}

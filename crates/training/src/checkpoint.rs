//! Best-model checkpoints: Burn record plus a JSON sidecar with the encoder config.

use burn::module::Module;
use burn::record::{BinFileRecorder, FullPrecisionSettings};
use burn::tensor::backend::Backend;
use models::{GatV2Config, LinkPredictor};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointMeta {
    pub model: GatV2Config,
    pub run: usize,
    pub best_epoch: Option<usize>,
    pub best_val_loss: f32,
    pub self_loops: bool,
}

pub fn checkpoint_path(dir: &Path, run: usize) -> PathBuf {
    dir.join(format!("link_predictor_run{run}.bin"))
}

pub fn sidecar_path(checkpoint: &Path) -> PathBuf {
    checkpoint.with_extension("json")
}

pub fn save_checkpoint<B: Backend>(
    dir: &Path,
    model: &LinkPredictor<B>,
    meta: &CheckpointMeta,
) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = checkpoint_path(dir, meta.run);
    let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
    model
        .clone()
        .save_file(&path, &recorder)
        .map_err(|e| anyhow::anyhow!("failed to save checkpoint {}: {e}", path.display()))?;
    fs::write(sidecar_path(&path), serde_json::to_vec_pretty(meta)?)?;
    Ok(path)
}

pub fn load_checkpoint<B: Backend>(
    path: &Path,
    device: &B::Device,
) -> anyhow::Result<(LinkPredictor<B>, CheckpointMeta)> {
    let sidecar = sidecar_path(path);
    let raw = fs::read(&sidecar)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", sidecar.display()))?;
    let meta: CheckpointMeta = serde_json::from_slice(&raw)?;
    let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
    let model = LinkPredictor::<B>::new(&meta.model, device)?
        .load_file(path, &recorder, device)
        .map_err(|e| anyhow::anyhow!("failed to load checkpoint {}: {e}", path.display()))?;
    Ok((model, meta))
}

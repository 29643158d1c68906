mod common;

use burn::backend::{ndarray::NdArray, Autodiff};
use graph_data::{DatasetPaths, SplitKind};
use std::fs;
use std::sync::{Mutex, MutexGuard};
use training::settings::RunSettings;
use training::{
    evaluate_split, load_checkpoint, run_experiment, LinkTensors, TrainConfig,
};

type Backend = NdArray<f32>;
type ADBackend = Autodiff<Backend>;

// Backend seeding is process-global; tests that initialize models take turns.
static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn settings(tmp: &std::path::Path, runs: usize) -> RunSettings {
    RunSettings {
        data: DatasetPaths::in_dir(tmp),
        self_loops: false,
        model: None,
        train: TrainConfig {
            epochs: 6,
            patience: 3,
            lr: 5e-3,
            freeze_probe: false,
            metrics_out: Some(tmp.join("logs/metrics.jsonl")),
        },
        runs,
        seed: Some(7),
        result_path: tmp.join("result.txt"),
        checkpoint_dir: Some(tmp.join("checkpoints")),
    }
}

#[test]
fn experiment_appends_one_result_line_per_run() -> anyhow::Result<()> {
    let _guard = serial();
    let tmp = tempfile::tempdir()?;
    let dataset = common::community_dataset();
    let settings = settings(tmp.path(), 2);
    let device = Default::default();

    let reports = run_experiment::<ADBackend>(&dataset, &settings, &device)?;
    assert_eq!(reports.len(), 2);

    let results = fs::read_to_string(&settings.result_path)?;
    let lines: Vec<&str> = results.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in &lines {
        assert!(line.starts_with("AUC: "), "unexpected line: {line}");
        assert!(line.contains(", F1 Score: ") && line.contains(", Accuracy: "));
    }

    let metrics_log = fs::read_to_string(tmp.path().join("logs/metrics.jsonl"))?;
    let epoch_lines = reports.iter().map(|r| r.epochs_run).sum::<usize>();
    assert_eq!(metrics_log.lines().count(), epoch_lines + reports.len());
    let last: serde_json::Value = serde_json::from_str(metrics_log.lines().last().unwrap())?;
    assert_eq!(last["run"], 1);
    assert!(last["test"]["auc"].is_number());
    Ok(())
}

#[test]
fn saved_checkpoint_reproduces_run_metrics() -> anyhow::Result<()> {
    let _guard = serial();
    let tmp = tempfile::tempdir()?;
    let dataset = common::community_dataset();
    let settings = settings(tmp.path(), 1);
    let device = Default::default();

    let reports = run_experiment::<ADBackend>(&dataset, &settings, &device)?;
    let report = &reports[0];
    let path = report.checkpoint.clone().expect("checkpoint written");

    let (model, meta) = load_checkpoint::<Backend>(&path, &device)?;
    assert_eq!(meta.run, 0);
    assert_eq!(meta.model.in_dim, 4);
    assert_eq!(meta.best_epoch, report.best_epoch);

    let data = LinkTensors::<Backend>::from_dataset(&dataset, &device);
    let metrics = evaluate_split(&model, &data, SplitKind::Test)?;
    assert!((metrics.auc - report.metrics.auc).abs() < 1e-6);
    assert_eq!(metrics.accuracy, report.metrics.accuracy);
    Ok(())
}

#[test]
fn mismatched_input_width_is_rejected() {
    let _guard = serial();
    let tmp = tempfile::tempdir().unwrap();
    let dataset = common::community_dataset();
    let mut settings = settings(tmp.path(), 1);
    settings.model = Some(models::GatV2Config::default());
    let device = Default::default();

    let err = run_experiment::<ADBackend>(&dataset, &settings, &device).unwrap_err();
    assert!(err.to_string().contains("in_dim"), "{err}");
}

#[test]
fn seeded_runs_are_reproducible_and_distinct() -> anyhow::Result<()> {
    let _guard = serial();
    let dataset = common::community_dataset();
    let device = Default::default();
    let run_twice = || -> anyhow::Result<Vec<training::RunReport>> {
        let tmp = tempfile::tempdir()?;
        let mut settings = settings(tmp.path(), 2);
        settings.seed = Some(11);
        settings.train.metrics_out = None;
        settings.checkpoint_dir = None;
        run_experiment::<ADBackend>(&dataset, &settings, &device)
    };

    let first = run_twice()?;
    let second = run_twice()?;
    assert_eq!(first[0].best_val_loss, second[0].best_val_loss);
    assert_eq!(first[0].metrics, second[0].metrics);
    assert_eq!(first[1].best_val_loss, second[1].best_val_loss);
    // Run 1 is seeded with seed + 1 and starts from different weights.
    assert_ne!(first[0].best_val_loss, first[1].best_val_loss);
    Ok(())
}

#[test]
fn unwritable_metrics_log_fails_before_any_run() -> anyhow::Result<()> {
    let _guard = serial();
    let tmp = tempfile::tempdir()?;
    let blocker = tmp.path().join("blocker");
    fs::write(&blocker, b"regular file")?;
    let dataset = common::community_dataset();
    let mut settings = settings(tmp.path(), 5);
    settings.train.metrics_out = Some(blocker.join("metrics.jsonl"));
    let device = Default::default();

    let err = run_experiment::<ADBackend>(&dataset, &settings, &device).unwrap_err();
    assert!(err.to_string().contains("blocker"), "{err}");
    assert!(!settings.result_path.exists(), "no run should have reported");
    Ok(())
}

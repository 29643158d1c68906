//! JSONL log of per-epoch losses and per-run test metrics.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::metrics::LinkMetrics;
use crate::trainer::EpochRecord;

/// Append-only handle on the `--metrics-out` file, opened once per experiment.
#[derive(Debug)]
pub struct MetricsLog {
    path: PathBuf,
    file: fs::File,
}

impl MetricsLog {
    /// Create parent directories and open `path` for appending.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!(
                    "failed to create metrics directory {}: {e}",
                    parent.display()
                )
            })?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| anyhow::anyhow!("failed to open metrics log {}: {e}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn epoch(&mut self, run: usize, record: &EpochRecord) -> anyhow::Result<()> {
        self.write_line(serde_json::json!({
            "run": run,
            "epoch": record.epoch,
            "train_loss": record.train_loss,
            "val_loss": record.val_loss,
            "improved": record.improved,
        }))
    }

    pub fn test(&mut self, run: usize, metrics: &LinkMetrics) -> anyhow::Result<()> {
        self.write_line(serde_json::json!({ "run": run, "test": metrics }))
    }

    fn write_line(&mut self, line: serde_json::Value) -> anyhow::Result<()> {
        writeln!(self.file, "{line}").map_err(|e| {
            anyhow::anyhow!(
                "failed to append metrics to {}: {e}",
                self.path.display()
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_one_json_object_per_line() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested/metrics.jsonl");
        let mut log = MetricsLog::open(&path).unwrap();
        let record = EpochRecord {
            epoch: 3,
            train_loss: 0.5,
            val_loss: 0.25,
            improved: true,
        };
        log.epoch(1, &record).unwrap();
        log.test(1, &LinkMetrics::default()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["epoch"], 3);
        assert_eq!(lines[0]["improved"], true);
        assert_eq!(lines[1]["test"]["auc"], 0.0);
    }

    #[test]
    fn open_error_names_the_path() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, b"not a directory").unwrap();

        let err = MetricsLog::open(&blocker.join("metrics.jsonl")).unwrap_err();
        assert!(err.to_string().contains("blocker"), "{err}");
    }
}

//! Optional TOML config file; CLI flags override anything set here.

use crate::common::DataPathOverrides;
use models::GatV2Config;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_NAME: &str = "gat-link.toml";
pub const CONFIG_ENV: &str = "GAT_LINK_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub data: DataSection,
    pub model: Option<GatV2Config>,
    #[serde(default)]
    pub train: TrainSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataSection {
    pub dir: Option<String>,
    pub graph: Option<String>,
    pub positive_train: Option<String>,
    pub positive_validation: Option<String>,
    pub positive_test: Option<String>,
    pub negative_train: Option<String>,
    pub negative_validation: Option<String>,
    pub negative_test: Option<String>,
    pub self_loops: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainSection {
    pub epochs: Option<usize>,
    pub patience: Option<usize>,
    pub lr: Option<f64>,
    pub runs: Option<usize>,
    pub seed: Option<u64>,
    pub freeze_probe: Option<bool>,
    pub result_path: Option<String>,
    pub metrics_out: Option<String>,
    pub checkpoint_dir: Option<String>,
}

impl ConfigFile {
    /// Explicit path, else `$GAT_LINK_CONFIG`, else `gat-link.toml` if present.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::read(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::read(Path::new(&path));
        }
        Ok(Self::from_path(Path::new(DEFAULT_CONFIG_NAME))?.unwrap_or_default())
    }

    /// `Ok(None)` when the file does not exist.
    pub fn from_path(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        Self::read(path).map(Some)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("loaded config from {}", path.display());
        Ok(cfg)
    }
}

impl DataSection {
    pub fn dir(&self) -> Option<PathBuf> {
        self.dir.as_deref().map(expand_path)
    }

    pub fn overrides(&self) -> DataPathOverrides {
        let p = |v: &Option<String>| v.as_deref().map(expand_path);
        DataPathOverrides {
            graph: p(&self.graph),
            positive_train: p(&self.positive_train),
            positive_validation: p(&self.positive_validation),
            positive_test: p(&self.positive_test),
            negative_train: p(&self.negative_train),
            negative_validation: p(&self.negative_validation),
            negative_test: p(&self.negative_test),
        }
    }
}

impl TrainSection {
    pub fn result_path(&self) -> Option<PathBuf> {
        self.result_path.as_deref().map(expand_path)
    }

    pub fn metrics_out(&self) -> Option<PathBuf> {
        self.metrics_out.as_deref().map(expand_path)
    }

    pub fn checkpoint_dir(&self) -> Option<PathBuf> {
        self.checkpoint_dir.as_deref().map(expand_path)
    }
}

/// Expand a leading `~` and `${VAR}` references.
pub fn expand_path(raw: &str) -> PathBuf {
    let mut out = raw.to_string();
    if let Some(stripped) = out.strip_prefix('~') {
        if let Ok(home) = std::env::var("HOME") {
            out = format!("{home}{stripped}");
        }
    }
    PathBuf::from(expand_env(&out))
}

fn expand_env(input: &str) -> String {
    let mut out = String::new();
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match std::env::var(key) {
                    Ok(val) => out.push_str(&val),
                    Err(_) => out.push_str(&format!("${{{key}}}")),
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

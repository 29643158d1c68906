//! Command-line plumbing shared by the `train` and `eval` binaries.

pub mod common;
pub mod config;
pub mod logging;
pub mod seed;

pub use common::{validate_backend_choice, BackendKind, DataArgs, DataPathOverrides};
pub use config::{ConfigError, ConfigFile, DataSection, TrainSection, CONFIG_ENV, DEFAULT_CONFIG_NAME};
pub use logging::init_tracing;
pub use seed::resolve_seed;

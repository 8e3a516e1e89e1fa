//! Project-level configuration support
//!
//! Loads configuration from `payback.toml` in the working directory, or
//! from the user config directory when no project file exists.
//!
//! # Configuration Format
//!
//! ```toml
//! # payback.toml
//!
//! [model]
//! path = "models/best_model.json"
//! threshold_path = "models/threshold_metadata.json"
//! fallback_threshold = 0.5
//! format = "native"  # or "xgboost-dump"
//! ```
//!
//! Relative paths are resolved against the working directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::classifier::{
    ArtifactFormat, DEFAULT_MODEL_PATH, DEFAULT_THRESHOLD, DEFAULT_THRESHOLD_PATH,
};

pub const CONFIG_FILE_NAME: &str = "payback.toml";

/// Written by `payback init`
pub const EXAMPLE_CONFIG: &str = r#"# payback configuration

[model]
# Serialized model artifact (kind-tagged JSON, or an XGBoost dump)
path = "models/best_model.json"

# JSON file with a numeric "threshold" field
threshold_path = "models/threshold_metadata.json"

# Used when the threshold file is missing or unreadable
fallback_threshold = 0.5

# "native" or "xgboost-dump"
format = "native"
"#;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PaybackConfig {
    #[serde(default)]
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModelConfig {
    pub path: Option<PathBuf>,
    pub threshold_path: Option<PathBuf>,
    pub fallback_threshold: Option<f64>,
    pub format: Option<ArtifactFormat>,
}

impl ModelConfig {
    pub fn model_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH))
    }

    pub fn threshold_path(&self) -> PathBuf {
        self.threshold_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_THRESHOLD_PATH))
    }

    pub fn fallback_threshold(&self) -> f64 {
        self.fallback_threshold.unwrap_or(DEFAULT_THRESHOLD)
    }

    pub fn format(&self) -> ArtifactFormat {
        self.format.unwrap_or_default()
    }
}

/// Get the user config file path
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("payback").join("config.toml"))
}

/// Load configuration for a working directory.
///
/// Tries `payback.toml` in `dir`, then the user config file. Files that
/// fail to parse are logged and skipped; with nothing usable the defaults
/// are returned.
pub fn load_project_config(dir: &Path) -> PaybackConfig {
    let candidates = std::iter::once(dir.join(CONFIG_FILE_NAME)).chain(user_config_path());

    for path in candidates {
        if !path.exists() {
            continue;
        }
        match load_config_file(&path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
            }
        }
    }

    debug!("No config found, using defaults");
    PaybackConfig::default()
}

/// Load configuration from a TOML file.
///
/// `model.fallback_threshold` must lie in [0, 1], the same range the
/// `--fallback-threshold` flag accepts.
pub fn load_config_file(path: &Path) -> anyhow::Result<PaybackConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: PaybackConfig = toml::from_str(&content)?;
    if let Some(t) = config.model.fallback_threshold {
        anyhow::ensure!(
            (0.0..=1.0).contains(&t),
            "model.fallback_threshold = {} is outside [0, 1]",
            t
        );
    }
    Ok(config)
}

//! Model + decision threshold loading
//!
//! The model artifact is required; the threshold metadata is optional. Any
//! problem reading the metadata degrades to the fallback threshold and is
//! logged instead of raised.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{GbdtScorer, Model, ModelArtifact};
use crate::config::ModelConfig;
use crate::error::{PaybackError, PaybackResult};

/// Threshold used when no metadata is available
pub const DEFAULT_THRESHOLD: f64 = 0.50;

pub const DEFAULT_MODEL_PATH: &str = "models/best_model.json";

pub const DEFAULT_THRESHOLD_PATH: &str = "models/threshold_metadata.json";

/// On-disk encoding of the model artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactFormat {
    /// `kind`-tagged JSON envelope
    #[default]
    Native,
    /// XGBoost JSON tree dump trained with `binary:logistic`
    XgboostDump,
}

/// Why the fallback threshold was used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    MissingFile,
    Unreadable,
    Malformed,
    MissingField,
}

/// Where the effective threshold came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdSource {
    Metadata,
    Fallback(FallbackReason),
}

#[derive(Debug, Deserialize)]
struct ThresholdMetadata {
    #[serde(default)]
    threshold: Option<f64>,
}

/// A model together with its decision threshold
#[derive(Debug)]
pub struct LoadedModel {
    pub model: Model,
    pub threshold: f64,
    pub threshold_source: ThresholdSource,
}

/// Builder for loading a model and its threshold
#[derive(Debug, Clone)]
pub struct ModelLoader {
    model_path: PathBuf,
    threshold_path: PathBuf,
    fallback_threshold: f64,
    format: ArtifactFormat,
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            threshold_path: PathBuf::from(DEFAULT_THRESHOLD_PATH),
            fallback_threshold: DEFAULT_THRESHOLD,
            format: ArtifactFormat::Native,
        }
    }
}

impl ModelLoader {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            ..Self::default()
        }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            model_path: config.model_path(),
            threshold_path: config.threshold_path(),
            fallback_threshold: config.fallback_threshold(),
            format: config.format(),
        }
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn with_threshold_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.threshold_path = path.into();
        self
    }

    pub fn with_fallback_threshold(mut self, threshold: f64) -> Self {
        self.fallback_threshold = threshold;
        self
    }

    pub fn with_format(mut self, format: ArtifactFormat) -> Self {
        self.format = format;
        self
    }

    pub fn load(&self) -> PaybackResult<LoadedModel> {
        let model = load_model(&self.model_path, self.format)?;
        let (threshold, threshold_source) =
            read_threshold(&self.threshold_path, self.fallback_threshold);
        Ok(LoadedModel {
            model,
            threshold,
            threshold_source,
        })
    }
}

/// Load a model artifact and its threshold.
///
/// Fails only when the model is missing or cannot be decoded; threshold
/// problems fall back to `fallback_threshold`.
pub fn load_model_and_threshold(
    model_path: impl AsRef<Path>,
    threshold_path: impl AsRef<Path>,
    fallback_threshold: f64,
) -> PaybackResult<(Model, f64)> {
    let loaded = ModelLoader::new(model_path.as_ref())
        .with_threshold_path(threshold_path.as_ref())
        .with_fallback_threshold(fallback_threshold)
        .load()?;
    Ok((loaded.model, loaded.threshold))
}

/// Decode a model artifact from disk
pub fn load_model(path: &Path, format: ArtifactFormat) -> PaybackResult<Model> {
    if !path.exists() {
        return Err(PaybackError::ModelNotFound {
            path: path.to_path_buf(),
        });
    }

    let model = match format {
        ArtifactFormat::Native => {
            let bytes = std::fs::read(path)?;
            let artifact: ModelArtifact =
                serde_json::from_slice(&bytes).map_err(|e| PaybackError::ModelDecode {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
            artifact.into_model()?
        }
        ArtifactFormat::XgboostDump => Model::scorer(GbdtScorer::load_xgboost(path)?),
    };

    debug!("Loaded {} model from {}", model.capability(), path.display());
    Ok(model)
}

/// Read the `threshold` field of a metadata file, falling back on any problem
pub fn read_threshold(path: &Path, fallback: f64) -> (f64, ThresholdSource) {
    let fall_back = |reason: FallbackReason| (fallback, ThresholdSource::Fallback(reason));

    if !path.exists() {
        debug!(
            "No threshold metadata at {}, using fallback {}",
            path.display(),
            fallback
        );
        return fall_back(FallbackReason::MissingFile);
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(
                "Failed to read {}: {}. Using fallback threshold {}",
                path.display(),
                e,
                fallback
            );
            return fall_back(FallbackReason::Unreadable);
        }
    };

    match serde_json::from_str::<ThresholdMetadata>(&content) {
        Ok(ThresholdMetadata {
            threshold: Some(threshold),
        }) => {
            if !(0.0..=1.0).contains(&threshold) {
                warn!(
                    "Threshold {} from {} is outside [0, 1]",
                    threshold,
                    path.display()
                );
            }
            debug!("Loaded threshold {} from {}", threshold, path.display());
            (threshold, ThresholdSource::Metadata)
        }
        Ok(ThresholdMetadata { threshold: None }) => {
            warn!(
                "{} has no 'threshold' field. Using fallback threshold {}",
                path.display(),
                fallback
            );
            fall_back(FallbackReason::MissingField)
        }
        Err(e) => {
            warn!(
                "Failed to parse {}: {}. Using fallback threshold {}",
                path.display(),
                e,
                fallback
            );
            fall_back(FallbackReason::Malformed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Capability;

    const LOGISTIC: &str = r#"{"kind": "logistic", "weights": [1.0, -1.0], "bias": 0.0}"#;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_model_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("best_model.json");
        let err = load_model_and_threshold(&missing, tmp.path().join("meta.json"), 0.5)
            .unwrap_err();
        match err {
            PaybackError::ModelNotFound { path } => assert_eq!(path, missing),
            other => panic!("expected ModelNotFound, got {other}"),
        }
    }

    #[test]
    fn test_undecodable_model() {
        let tmp = tempfile::tempdir().unwrap();
        let model = tmp.path().join("best_model.pkl");
        std::fs::write(&model, [0x80u8, 0x04, 0x95, 0x2b]).unwrap();
        let err = load_model(&model, ArtifactFormat::Native).unwrap_err();
        assert!(matches!(err, PaybackError::ModelDecode { .. }), "{err}");
    }

    #[test]
    fn test_threshold_from_metadata() {
        let tmp = tempfile::tempdir().unwrap();
        let model = write(tmp.path(), "best_model.json", LOGISTIC);
        let meta = write(
            tmp.path(),
            "threshold_metadata.json",
            r#"{"threshold": 0.42, "metric": "f1", "score": 0.91}"#,
        );

        let (model, threshold) = load_model_and_threshold(&model, &meta, 0.5).unwrap();
        assert_eq!(model.capability(), Capability::ScoreCapable);
        assert!((threshold - 0.42).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_metadata_uses_fallback() {
        let tmp = tempfile::tempdir().unwrap();
        let model = write(tmp.path(), "best_model.json", LOGISTIC);

        let loaded = ModelLoader::new(&model)
            .with_threshold_path(tmp.path().join("absent.json"))
            .load()
            .unwrap();
        assert_eq!(loaded.threshold, DEFAULT_THRESHOLD);
        assert_eq!(
            loaded.threshold_source,
            ThresholdSource::Fallback(FallbackReason::MissingFile)
        );
    }

    #[test]
    fn test_missing_field_uses_fallback() {
        let tmp = tempfile::tempdir().unwrap();
        let meta = write(tmp.path(), "meta.json", r#"{"metric": "auc"}"#);
        assert_eq!(
            read_threshold(&meta, 0.5),
            (0.5, ThresholdSource::Fallback(FallbackReason::MissingField))
        );

        let null = write(tmp.path(), "null.json", r#"{"threshold": null}"#);
        assert_eq!(read_threshold(&null, 0.3).0, 0.3);
    }

    #[test]
    fn test_malformed_metadata_uses_fallback() {
        let tmp = tempfile::tempdir().unwrap();
        for (name, content) in [
            ("broken.json", "{ threshold: "),
            ("string.json", r#"{"threshold": "high"}"#),
            ("scalar.json", "0.4"),
        ] {
            let meta = write(tmp.path(), name, content);
            assert_eq!(
                read_threshold(&meta, 0.55),
                (0.55, ThresholdSource::Fallback(FallbackReason::Malformed)),
                "{name}"
            );
        }
    }

    #[test]
    fn test_metadata_directory_is_unreadable() {
        let tmp = tempfile::tempdir().unwrap();
        let (threshold, source) = read_threshold(tmp.path(), 0.5);
        assert_eq!(threshold, 0.5);
        assert_eq!(source, ThresholdSource::Fallback(FallbackReason::Unreadable));
    }

    #[test]
    fn test_out_of_range_threshold_is_kept() {
        let tmp = tempfile::tempdir().unwrap();
        let meta = write(tmp.path(), "meta.json", r#"{"threshold": 1.2}"#);
        assert_eq!(read_threshold(&meta, 0.5), (1.2, ThresholdSource::Metadata));
    }

    #[test]
    fn test_artifact_format_names() {
        let format: ArtifactFormat = serde_json::from_str(r#""xgboost-dump""#).unwrap();
        assert_eq!(format, ArtifactFormat::XgboostDump);
        assert_eq!(ArtifactFormat::default(), ArtifactFormat::Native);
    }
}

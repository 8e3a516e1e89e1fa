//! Persisted model envelope
//!
//! A model file is one JSON object tagged by `kind`:
//!
//! ```json
//! {"kind": "logistic", "weights": [0.8, -1.2], "bias": 0.1}
//! ```
//!
//! A `pipeline` pairs a fitted scaler with an inner artifact and takes the
//! inner model's capability:
//!
//! ```json
//! {"kind": "pipeline", "scaler": {"mean": [0.5], "scale": [2.0]},
//!  "model": {"kind": "logistic", "weights": [1.5]}}
//! ```
//!
//! Capability detection happens here, once, when the envelope is turned
//! into a [`Model`].

use serde::{Deserialize, Serialize};

use super::{
    GbdtScorer, LogisticScorer, MlpClassifier, Model, ProbabilityEstimator, ScoreOutput, Scorer,
    SoftmaxScorer,
};
use crate::data::FeatureTable;
use crate::error::{PaybackError, PaybackResult};

#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Mlp(MlpClassifier),
    Gbdt(GbdtScorer),
    Logistic(LogisticScorer),
    Softmax(SoftmaxScorer),
    /// Fitted preprocessing step; persisted alongside models but not one
    Scaler(StandardScaler),
    /// Scaler applied to the features before the inner model
    Pipeline {
        scaler: StandardScaler,
        model: Box<ModelArtifact>,
    },
}

impl ModelArtifact {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::Mlp(_) => "mlp",
            ModelArtifact::Gbdt(_) => "gbdt",
            ModelArtifact::Logistic(_) => "logistic",
            ModelArtifact::Softmax(_) => "softmax",
            ModelArtifact::Scaler(_) => "scaler",
            ModelArtifact::Pipeline { .. } => "pipeline",
        }
    }

    /// Resolve the prediction interface this artifact exposes
    pub fn into_model(self) -> PaybackResult<Model> {
        let kind = self.kind();
        let model = match self {
            ModelArtifact::Mlp(mlp) => {
                mlp.validate()?;
                Model::probability(mlp)
            }
            ModelArtifact::Gbdt(gbdt) => Model::scorer(gbdt),
            ModelArtifact::Logistic(linear) => Model::scorer(linear),
            ModelArtifact::Softmax(softmax) => {
                softmax.validate()?;
                Model::scorer(softmax)
            }
            ModelArtifact::Scaler(_) => Model::Unsupported {
                kind: kind.to_string(),
            },
            ModelArtifact::Pipeline { scaler, model } => {
                scaler.validate()?;
                match model.into_model()? {
                    Model::ProbabilityCapable(inner) => {
                        Model::probability(Scaled { scaler, inner })
                    }
                    Model::ScoreCapable(inner) => Model::scorer(Scaled { scaler, inner }),
                    Model::Unsupported { kind: inner } => Model::Unsupported {
                        kind: format!("{kind}({inner})"),
                    },
                }
            }
        };
        tracing::debug!("Artifact '{}' resolved to {} capability", kind, model.capability());
        Ok(model)
    }
}

/// Per-column standardization: `(x - mean) / scale`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn validate(&self) -> PaybackResult<()> {
        if self.mean.len() != self.scale.len() {
            return Err(PaybackError::InvalidFeatures(format!(
                "scaler has {} means but {} scales",
                self.mean.len(),
                self.scale.len()
            )));
        }
        Ok(())
    }

    pub fn transform(&self, features: &FeatureTable) -> PaybackResult<FeatureTable> {
        self.validate()?;
        if features.n_cols() != self.mean.len() {
            return Err(PaybackError::InvalidFeatures(format!(
                "scaler fitted on {} columns, table has {}",
                self.mean.len(),
                features.n_cols()
            )));
        }
        let rows = features
            .rows()
            .iter()
            .map(|row| {
                row.iter()
                    .zip(self.mean.iter().zip(&self.scale))
                    .map(|(x, (m, s))| if *s == 0.0 { x - m } else { (x - m) / s })
                    .collect()
            })
            .collect();
        FeatureTable::new(features.columns().to_vec(), rows)
    }
}

/// Inner model fed scaled features
struct Scaled<M: ?Sized> {
    scaler: StandardScaler,
    inner: Box<M>,
}

impl ProbabilityEstimator for Scaled<dyn ProbabilityEstimator> {
    fn predict_proba(&self, features: &FeatureTable) -> PaybackResult<Vec<[f64; 2]>> {
        self.inner.predict_proba(&self.scaler.transform(features)?)
    }
}

impl Scorer for Scaled<dyn Scorer> {
    fn predict(&self, features: &FeatureTable) -> PaybackResult<ScoreOutput> {
        self.inner.predict(&self.scaler.transform(features)?)
    }
}

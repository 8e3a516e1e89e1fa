//! Binary classifier handles, loading and prediction
//!
//! A persisted model is decoded once into a [`Model`], whose variant records
//! which prediction interface it exposes:
//!
//! - `ProbabilityCapable`: per-row `[p(0), p(1)]` pairs (see [`ProbabilityEstimator`])
//! - `ScoreCapable`: a generic `predict` whose output may be probabilities,
//!   raw logits, or a two-column probability matrix (see [`Scorer`])
//! - `Unsupported`: a persisted object with no prediction interface
//!
//! [`predict_probabilities`] normalizes all of these into one positive-class
//! probability per row.

mod artifact;
pub mod gbdt_model;
pub mod linear;
pub mod loader;
pub mod mlp;
pub mod predict;

pub use artifact::{ModelArtifact, StandardScaler};
pub use gbdt_model::GbdtScorer;
pub use linear::{LogisticScorer, SoftmaxScorer};
pub use loader::{
    load_model, load_model_and_threshold, read_threshold, ArtifactFormat, FallbackReason,
    LoadedModel, ModelLoader, ThresholdSource, DEFAULT_MODEL_PATH, DEFAULT_THRESHOLD,
    DEFAULT_THRESHOLD_PATH,
};
pub use mlp::MlpClassifier;
pub use predict::{apply_threshold, predict_probabilities, predict_with_threshold, sigmoid};

use std::fmt;

use crate::data::FeatureTable;
use crate::error::PaybackResult;

/// Raw output of a generic `predict` call
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreOutput {
    /// One value per row
    Vector(Vec<f64>),
    /// Row-major values, one inner vector per row
    Matrix(Vec<Vec<f64>>),
}

impl ScoreOutput {
    /// Collapse an `n x 1` matrix into a vector; other shapes are unchanged.
    pub fn squeeze(self) -> Self {
        match self {
            ScoreOutput::Matrix(rows) if !rows.is_empty() && rows.iter().all(|r| r.len() == 1) => {
                ScoreOutput::Vector(rows.into_iter().map(|r| r[0]).collect())
            }
            other => other,
        }
    }
}

/// Models exposing native class-probability estimates
pub trait ProbabilityEstimator: Send + Sync {
    /// `[p(negative), p(positive)]` for each row
    fn predict_proba(&self, features: &FeatureTable) -> PaybackResult<Vec<[f64; 2]>>;
}

/// Models exposing only a generic scoring operation
pub trait Scorer: Send + Sync {
    fn predict(&self, features: &FeatureTable) -> PaybackResult<ScoreOutput>;
}

/// Which prediction interface a loaded model exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ProbabilityCapable,
    ScoreCapable,
    Unsupported,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::ProbabilityCapable => "probability",
            Capability::ScoreCapable => "score",
            Capability::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

/// A loaded, immutable classifier handle
pub enum Model {
    ProbabilityCapable(Box<dyn ProbabilityEstimator>),
    ScoreCapable(Box<dyn Scorer>),
    Unsupported { kind: String },
}

impl Model {
    /// Wrap a probability estimator
    pub fn probability<M: ProbabilityEstimator + 'static>(model: M) -> Self {
        Model::ProbabilityCapable(Box::new(model))
    }

    /// Wrap a generic scorer
    pub fn scorer<M: Scorer + 'static>(model: M) -> Self {
        Model::ScoreCapable(Box::new(model))
    }

    pub fn capability(&self) -> Capability {
        match self {
            Model::ProbabilityCapable(_) => Capability::ProbabilityCapable,
            Model::ScoreCapable(_) => Capability::ScoreCapable,
            Model::Unsupported { .. } => Capability::Unsupported,
        }
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Unsupported { kind } => f.debug_struct("Unsupported").field("kind", kind).finish(),
            other => write!(f, "Model({})", other.capability()),
        }
    }
}

//! Linear scorers
//!
//! Neither exposes `predict_proba`:
//! - [`LogisticScorer`] returns raw logits `w·x + b`, one per row
//! - [`SoftmaxScorer`] returns an `n x 2` per-class probability matrix

use serde::{Deserialize, Serialize};

use super::{ScoreOutput, Scorer};
use crate::data::FeatureTable;
use crate::error::{PaybackError, PaybackResult};

fn dot(weights: &[f64], row: &[f64]) -> f64 {
    weights.iter().zip(row).map(|(w, x)| w * x).sum()
}

fn check_width(expected: usize, features: &FeatureTable) -> PaybackResult<()> {
    if features.n_cols() != expected {
        return Err(PaybackError::InvalidFeatures(format!(
            "linear model expects {} features, table has {}",
            expected,
            features.n_cols()
        )));
    }
    Ok(())
}

/// Binary linear model emitting unbounded margins
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticScorer {
    weights: Vec<f64>,
    #[serde(default)]
    bias: f64,
}

impl LogisticScorer {
    pub fn new(weights: Vec<f64>, bias: f64) -> Self {
        Self { weights, bias }
    }
}

impl Scorer for LogisticScorer {
    fn predict(&self, features: &FeatureTable) -> PaybackResult<ScoreOutput> {
        check_width(self.weights.len(), features)?;
        Ok(ScoreOutput::Vector(
            features
                .rows()
                .iter()
                .map(|row| self.bias + dot(&self.weights, row))
                .collect(),
        ))
    }
}

/// Two-output linear model emitting per-class probabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftmaxScorer {
    /// One weight row per class: [negative, positive]
    weights: [Vec<f64>; 2],
    #[serde(default)]
    bias: [f64; 2],
}

impl SoftmaxScorer {
    pub fn new(weights: [Vec<f64>; 2], bias: [f64; 2]) -> PaybackResult<Self> {
        let model = Self { weights, bias };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> PaybackResult<()> {
        if self.weights[0].len() != self.weights[1].len() {
            return Err(PaybackError::InvalidFeatures(
                "softmax weight rows have differing widths".to_string(),
            ));
        }
        Ok(())
    }
}

impl Scorer for SoftmaxScorer {
    fn predict(&self, features: &FeatureTable) -> PaybackResult<ScoreOutput> {
        check_width(self.weights[0].len(), features)?;
        let rows = features
            .rows()
            .iter()
            .map(|row| {
                let z0 = self.bias[0] + dot(&self.weights[0], row);
                let z1 = self.bias[1] + dot(&self.weights[1], row);
                let max = z0.max(z1);
                let (e0, e1) = ((z0 - max).exp(), (z1 - max).exp());
                vec![e0 / (e0 + e1), e1 / (e0 + e1)]
            })
            .collect();
        Ok(ScoreOutput::Matrix(rows))
    }
}

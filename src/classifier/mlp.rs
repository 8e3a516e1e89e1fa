//! Two-layer perceptron with softmax output
//!
//! Architecture: Input → Linear(hidden) → ReLU → Linear(2) → Softmax.
//! Exposes native class probabilities.

use serde::{Deserialize, Serialize};

use super::ProbabilityEstimator;
use crate::data::FeatureTable;
use crate::error::{PaybackError, PaybackResult};

/// 2-layer MLP classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpClassifier {
    /// First layer weights [hidden_size x input_size]
    w1: Vec<Vec<f64>>,
    /// First layer bias [hidden_size]
    b1: Vec<f64>,
    /// Second layer weights [2 x hidden_size]
    w2: Vec<Vec<f64>>,
    /// Second layer bias [2]
    b2: Vec<f64>,
}

impl MlpClassifier {
    /// Create with pre-trained weights
    pub fn with_weights(
        w1: Vec<Vec<f64>>,
        b1: Vec<f64>,
        w2: Vec<Vec<f64>>,
        b2: Vec<f64>,
    ) -> PaybackResult<Self> {
        let model = Self { w1, b1, w2, b2 };
        model.validate()?;
        Ok(model)
    }

    pub fn input_size(&self) -> usize {
        self.w1.first().map(Vec::len).unwrap_or(0)
    }

    pub fn hidden_size(&self) -> usize {
        self.w1.len()
    }

    /// Check layer dimensions agree (weights decoded from disk are unchecked)
    pub fn validate(&self) -> PaybackResult<()> {
        let input = self.input_size();
        let hidden = self.hidden_size();
        let bad = |msg: String| Err(PaybackError::InvalidFeatures(msg));

        if self.w1.iter().any(|row| row.len() != input) {
            return bad("MLP first layer rows have differing widths".to_string());
        }
        if self.b1.len() != hidden {
            return bad(format!("MLP b1 has {} entries, expected {}", self.b1.len(), hidden));
        }
        if self.w2.len() != 2 || self.w2.iter().any(|row| row.len() != hidden) {
            return bad(format!("MLP second layer must be 2 x {}", hidden));
        }
        if self.b2.len() != 2 {
            return bad(format!("MLP b2 has {} entries, expected 2", self.b2.len()));
        }
        Ok(())
    }

    /// Forward pass for one row, returning `[p(0), p(1)]`
    fn forward(&self, x: &[f64]) -> [f64; 2] {
        // Layer 1: Linear + ReLU
        let hidden: Vec<f64> = self
            .w1
            .iter()
            .zip(&self.b1)
            .map(|(w, b)| {
                let sum = b + w.iter().zip(x).map(|(w, x)| w * x).sum::<f64>();
                sum.max(0.0)
            })
            .collect();

        // Layer 2: Linear
        let mut logits = [0.0f64; 2];
        for (i, logit) in logits.iter_mut().enumerate() {
            *logit = self.b2[i]
                + self.w2[i]
                    .iter()
                    .zip(&hidden)
                    .map(|(w, h)| w * h)
                    .sum::<f64>();
        }

        // Softmax
        let max_logit = logits[0].max(logits[1]);
        let exp0 = (logits[0] - max_logit).exp();
        let exp1 = (logits[1] - max_logit).exp();
        let sum = exp0 + exp1;

        [exp0 / sum, exp1 / sum]
    }
}

impl ProbabilityEstimator for MlpClassifier {
    fn predict_proba(&self, features: &FeatureTable) -> PaybackResult<Vec<[f64; 2]>> {
        if features.n_cols() != self.input_size() {
            return Err(PaybackError::InvalidFeatures(format!(
                "MLP expects {} features, table has {}",
                self.input_size(),
                features.n_cols()
            )));
        }
        Ok(features.rows().iter().map(|row| self.forward(row)).collect())
    }
}

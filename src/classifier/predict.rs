//! Model-agnostic probability and label prediction
//!
//! Output conventions differ between model families:
//! - probability estimators return `[p(0), p(1)]` per row
//! - scorers return a vector of probabilities, a vector of raw logits, or an
//!   `n x 2` per-class probability matrix
//!
//! Known accuracy risk: a 1-D score vector is read as probabilities whenever
//! every value lies in [0, 1]. Logits that happen to fall in that range are
//! returned untransformed.

use super::{Model, ScoreOutput};
use crate::data::FeatureTable;
use crate::error::{PaybackError, PaybackResult};

/// Logistic function `1 / (1 + e^-x)`
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Probability of the positive class for every row of `features`.
///
/// The result always has one entry per row.
pub fn predict_probabilities(model: &Model, features: &FeatureTable) -> PaybackResult<Vec<f64>> {
    let expected = features.n_rows();

    let probs = match model {
        Model::ProbabilityCapable(estimator) => estimator
            .predict_proba(features)?
            .into_iter()
            .map(|pair| pair[1])
            .collect(),
        Model::ScoreCapable(scorer) => probabilities_from_scores(scorer.predict(features)?)?,
        Model::Unsupported { kind } => {
            return Err(PaybackError::NoPredictionInterface { kind: kind.clone() });
        }
    };

    check_len(expected, probs)
}

/// 0/1 labels: 1 when the positive-class probability is `>= threshold`
pub fn predict_with_threshold(
    model: &Model,
    features: &FeatureTable,
    threshold: f64,
) -> PaybackResult<Vec<u8>> {
    let probs = predict_probabilities(model, features)?;
    Ok(apply_threshold(&probs, threshold))
}

/// Threshold an already computed probability vector (inclusive boundary)
pub fn apply_threshold(probs: &[f64], threshold: f64) -> Vec<u8> {
    probs.iter().map(|&p| u8::from(p >= threshold)).collect()
}

fn probabilities_from_scores(output: ScoreOutput) -> PaybackResult<Vec<f64>> {
    match output.squeeze() {
        ScoreOutput::Vector(values) => {
            if values.iter().all(|v| (0.0..=1.0).contains(v)) {
                Ok(values)
            } else {
                Ok(values.into_iter().map(sigmoid).collect())
            }
        }
        ScoreOutput::Matrix(rows) => {
            if let Some(bad) = rows.iter().find(|r| r.len() != 2) {
                return Err(PaybackError::UnexpectedOutputShape {
                    rows: rows.len(),
                    cols: bad.len(),
                });
            }
            Ok(rows.into_iter().map(|r| r[1]).collect())
        }
    }
}

fn check_len(expected: usize, probs: Vec<f64>) -> PaybackResult<Vec<f64>> {
    if probs.len() != expected {
        return Err(PaybackError::OutputLength {
            expected,
            actual: probs.len(),
        });
    }
    Ok(probs)
}

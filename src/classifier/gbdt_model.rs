//! GBDT model wrapper
//!
//! Wraps the `gbdt` crate to provide:
//! - Decoding from the native artifact envelope or an XGBoost JSON dump
//! - Batch scoring over a `FeatureTable`
//!
//! `GBDT::predict` has no separate probability method. Depending on the
//! training loss its output is already a probability (`LogLikelyhood`,
//! `binary:logistic` dumps) or an unbounded raw score, so the wrapper is
//! exposed as a [`Scorer`] and the predictor decides how to read it.
//!
//! Note: the gbdt crate internally uses `f32` (`ValueType`), while feature
//! tables store `f64`. Conversions happen at the crate boundary.

use std::path::Path;

use gbdt::decision_tree::{Data, VALUE_TYPE_UNKNOWN};
use gbdt::gradient_boost::GBDT;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ScoreOutput, Scorer};
use crate::data::FeatureTable;
use crate::error::{PaybackError, PaybackResult};

/// Objective used when reading XGBoost dumps (sigmoid output)
const XGBOOST_OBJECTIVE: &str = "binary:logistic";

/// Convert one feature row (f64) to a `Vec<f32>` for the gbdt crate.
///
/// `NaN` (a null cell) becomes `VALUE_TYPE_UNKNOWN` so trees follow their
/// learned missing-value branch.
#[inline]
fn row_to_f32(row: &[f64]) -> Vec<f32> {
    row.iter()
        .map(|&v| if v.is_nan() { VALUE_TYPE_UNKNOWN } else { v as f32 })
        .collect()
}

/// Feature index of a dump node's `split` (`3` or `"f3"`)
fn split_index(split: &Value) -> Option<usize> {
    match split {
        Value::Number(n) => n.as_u64().map(|v| v as usize),
        Value::String(name) => {
            let digits = name.trim_start_matches(|c: char| !c.is_ascii_digit());
            digits.parse().ok()
        }
        _ => None,
    }
}

/// Highest feature index any node of a dump tree splits on
fn max_split_index(node: &Value) -> Option<usize> {
    let own = node.get("split").and_then(split_index);
    let children = node
        .get("children")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(max_split_index);
    own.into_iter().chain(children).max()
}

/// Thin wrapper around `gbdt::gradient_boost::GBDT`
#[derive(Serialize, Deserialize)]
pub struct GbdtScorer {
    model: GBDT,
    /// Columns a feature table must carry; trees index features below this
    feature_size: usize,
}

impl GbdtScorer {
    /// Load a model from an XGBoost JSON dump file on disk.
    ///
    /// The dump is a base-score line followed by a JSON array of trees. The
    /// required feature count is one past the highest split index.
    pub fn load_xgboost(path: &Path) -> PaybackResult<Self> {
        let decode_err = |message: String| PaybackError::ModelDecode {
            path: path.to_path_buf(),
            message,
        };
        let content = std::fs::read_to_string(path)
            .map_err(|e| decode_err(format!("failed to read XGBoost dump: {e}")))?;

        let trees: Value = content
            .split_once('\n')
            .map(|(_, rest)| serde_json::from_str::<Value>(rest))
            .ok_or_else(|| decode_err("missing base score line".to_string()))?
            .map_err(|e| decode_err(format!("invalid tree JSON: {e}")))?;
        let feature_size = trees
            .as_array()
            .ok_or_else(|| decode_err("expected a JSON array of trees".to_string()))?
            .iter()
            .filter_map(max_split_index)
            .max()
            .map_or(0, |i| i + 1);

        let reader = std::io::Cursor::new(content.as_bytes());
        let model = GBDT::from_xgboost_reader(reader, XGBOOST_OBJECTIVE)
            .map_err(|e| decode_err(format!("failed to load XGBoost dump: {e}")))?;
        Ok(Self {
            model,
            feature_size,
        })
    }

    /// Wrap an already-trained `GBDT` instance fitted on `feature_size` columns.
    pub fn from_trained(model: GBDT, feature_size: usize) -> Self {
        Self {
            model,
            feature_size,
        }
    }
}

impl Scorer for GbdtScorer {
    fn predict(&self, features: &FeatureTable) -> PaybackResult<ScoreOutput> {
        if features.is_empty() {
            return Ok(ScoreOutput::Vector(Vec::new()));
        }
        if features.n_cols() < self.feature_size {
            return Err(PaybackError::InvalidFeatures(format!(
                "GBDT model splits on {} features, table has {}",
                self.feature_size,
                features.n_cols()
            )));
        }

        let data: Vec<Data> = features
            .rows()
            .iter()
            .map(|row| Data::new_test_data(row_to_f32(row), None))
            .collect();

        let preds = self.model.predict(&data);
        Ok(ScoreOutput::Vector(
            preds.into_iter().map(|p| p as f64).collect(),
        ))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use gbdt::config::Config;

    /// Rows whose first feature alone separates the two classes.
    pub(crate) fn separable_rows() -> (Vec<Vec<f64>>, Vec<f64>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            let positive = i % 2 == 0;
            rows.push(vec![if positive { 1.0 } else { 0.0 }, (i as f64 * 0.37).sin()]);
            labels.push(if positive { 1.0 } else { -1.0 });
        }
        (rows, labels)
    }

    /// Train a tiny model; `loss` is a gbdt loss name.
    pub(crate) fn train_tiny(loss: &str, label_scale: f64) -> GBDT {
        let (rows, labels) = separable_rows();

        let mut cfg = Config::new();
        cfg.set_feature_size(2);
        cfg.set_max_depth(2);
        cfg.set_iterations(10);
        cfg.set_shrinkage(0.3);
        cfg.set_loss(loss);
        cfg.set_debug(false);
        cfg.set_training_optimization_level(2);
        cfg.set_min_leaf_size(1);

        let mut training_data: Vec<Data> = rows
            .iter()
            .zip(&labels)
            .map(|(r, &label)| {
                Data::new_training_data(row_to_f32(r), 1.0_f32, (label * label_scale) as f32, None)
            })
            .collect();

        let mut gbdt = GBDT::new(&cfg);
        gbdt.fit(&mut training_data);
        gbdt
    }

    /// `train_tiny` wrapped as a scorer over its two training columns
    pub(crate) fn tiny_scorer(loss: &str, label_scale: f64) -> GbdtScorer {
        GbdtScorer::from_trained(train_tiny(loss, label_scale), 2)
    }

    /// One split on feature 0 at 0.5; missing values take the `yes` branch.
    const MISSING_LEFT_DUMP: &str = r#"0.0
[{"nodeid": 0, "depth": 0, "split": 0, "split_condition": 0.5, "yes": 1, "no": 2, "missing": 1,
  "children": [{"nodeid": 1, "leaf": -2.0}, {"nodeid": 2, "leaf": 2.0}]}]
"#;

    #[test]
    fn test_predict_one_value_per_row() {
        let scorer = tiny_scorer("LogLikelyhood", 1.0);
        let (rows, _) = separable_rows();
        let table = FeatureTable::from_rows(rows).unwrap();

        let ScoreOutput::Vector(values) = scorer.predict(&table).unwrap() else {
            panic!("expected vector output");
        };
        assert_eq!(values.len(), table.n_rows());
        assert!(
            values.iter().all(|v| (0.0..=1.0).contains(v)),
            "LogLikelyhood output should be probabilities, got {:?}",
            values
        );
    }

    #[test]
    fn test_predict_empty_table() {
        let scorer = tiny_scorer("LogLikelyhood", 1.0);
        let table = FeatureTable::from_rows(vec![]).unwrap();
        assert_eq!(
            scorer.predict(&table).unwrap(),
            ScoreOutput::Vector(Vec::new())
        );
    }

    #[test]
    fn test_serde_roundtrip_preserves_predictions() {
        let scorer = tiny_scorer("SquaredError", 5.0);
        let json = serde_json::to_string(&scorer).unwrap();
        let loaded: GbdtScorer = serde_json::from_str(&json).unwrap();

        let table = FeatureTable::from_rows(vec![vec![1.0, 0.2], vec![0.0, 0.2]]).unwrap();
        let (ScoreOutput::Vector(before), ScoreOutput::Vector(after)) =
            (scorer.predict(&table).unwrap(), loaded.predict(&table).unwrap())
        else {
            panic!("expected vector output");
        };
        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(&after) {
            assert!((a - b).abs() < 1e-6, "loaded model drifted: {} vs {}", a, b);
        }
    }

    #[test]
    fn test_load_xgboost_missing_file() {
        let err = GbdtScorer::load_xgboost(Path::new("/nonexistent/xgb_dump.json"));
        assert!(matches!(err, Err(PaybackError::ModelDecode { .. })));
    }

    #[test]
    fn test_narrow_table_is_rejected() {
        let scorer = tiny_scorer("LogLikelyhood", 1.0);
        let table = FeatureTable::from_rows(vec![vec![1.0]]).unwrap();
        match scorer.predict(&table) {
            Err(PaybackError::InvalidFeatures(msg)) => assert!(msg.contains("2 features"), "{msg}"),
            Err(other) => panic!("expected InvalidFeatures, got {other}"),
            Ok(out) => panic!("expected an error, got {:?}", out),
        }

        let no_columns = FeatureTable::from_rows(vec![vec![]]).unwrap();
        assert!(scorer.predict(&no_columns).is_err());
    }

    #[test]
    fn test_xgboost_dump_feature_size() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("xgb.model");
        std::fs::write(&path, MISSING_LEFT_DUMP.replace("\"split\": 0", "\"split\": \"f3\"")).unwrap();
        let scorer = GbdtScorer::load_xgboost(&path).unwrap();

        // "f3" needs four columns
        let three = FeatureTable::from_rows(vec![vec![0.0; 3]]).unwrap();
        assert!(matches!(
            scorer.predict(&three),
            Err(PaybackError::InvalidFeatures(_))
        ));
        let four = FeatureTable::from_rows(vec![vec![0.0; 4]]).unwrap();
        let ScoreOutput::Vector(values) = scorer.predict(&four).unwrap() else {
            panic!("expected vector output");
        };
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn test_null_cells_follow_missing_branch() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("xgb.model");
        std::fs::write(&path, MISSING_LEFT_DUMP).unwrap();
        let scorer = GbdtScorer::load_xgboost(&path).unwrap();

        let table = crate::data::Dataset::from_json_str(r#"[{"x": 0.1}, {"x": null}, {"x": 0.9}]"#)
            .unwrap()
            .to_feature_table(None)
            .unwrap();
        let ScoreOutput::Vector(values) = scorer.predict(&table).unwrap() else {
            panic!("expected vector output");
        };
        let low = 1.0 / (1.0 + 2.0_f64.exp());
        assert!((values[0] - low).abs() < 1e-5, "{:?}", values);
        assert!((values[1] - low).abs() < 1e-5, "null row took the wrong branch: {:?}", values);
        assert!((values[2] - (1.0 - low)).abs() < 1e-5, "{:?}", values);
    }

    #[test]
    fn test_load_xgboost_rejects_garbage() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("xgb.model");
        std::fs::write(&path, "0.0\n{not json").unwrap();
        assert!(matches!(
            GbdtScorer::load_xgboost(&path),
            Err(PaybackError::ModelDecode { .. })
        ));
    }
}

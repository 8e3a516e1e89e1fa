//! Record-oriented dataset loaded from JSON

use std::path::Path;

use serde_json::Value;

use super::table::FeatureTable;
use crate::error::{PaybackError, PaybackResult};

/// One row of a dataset: column name -> value, in document order
pub type Record = serde_json::Map<String, Value>;

/// Rows of heterogeneous JSON records (a JSON array of objects on disk)
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Parse a JSON array of objects
    pub fn from_json_str(json: &str) -> PaybackResult<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| PaybackError::InvalidFeatures(format!("invalid JSON: {e}")))?;
        let Value::Array(items) = value else {
            return Err(PaybackError::InvalidFeatures(
                "expected a JSON array of records".to_string(),
            ));
        };

        let records = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(map) => Ok(map),
                other => Err(PaybackError::InvalidFeatures(format!(
                    "record {} is not an object: {}",
                    i, other
                ))),
            })
            .collect::<PaybackResult<Vec<_>>>()?;

        Ok(Self::from_records(records))
    }

    /// Load a JSON records file from disk
    pub fn load(path: &Path) -> PaybackResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let dataset = Self::from_json_str(&content)?;
        tracing::debug!("Loaded {} records from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column names of the first record, in document order
    pub fn column_names(&self) -> Vec<String> {
        self.records
            .first()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Stringified non-null values of `column`, one per record that has it.
    ///
    /// Null and absent cells are skipped. Fails when no record carries the
    /// column at all.
    pub fn column_values(&self, column: &str) -> PaybackResult<Vec<String>> {
        if !self.records.iter().any(|r| r.contains_key(column)) {
            return Err(PaybackError::ColumnNotFound(column.to_string()));
        }

        Ok(self
            .records
            .iter()
            .filter_map(|r| r.get(column))
            .filter(|v| !v.is_null())
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect())
    }

    /// Convert to a numeric feature table.
    ///
    /// Uses `columns` when given, otherwise the first record's columns.
    /// Booleans become 0/1, null or absent cells become NaN, and any other
    /// non-numeric cell is rejected.
    pub fn to_feature_table(&self, columns: Option<&[String]>) -> PaybackResult<FeatureTable> {
        let columns: Vec<String> = match columns {
            Some(cols) => cols.to_vec(),
            None => self.column_names(),
        };

        let mut rows = Vec::with_capacity(self.records.len());
        for (i, record) in self.records.iter().enumerate() {
            let row = columns
                .iter()
                .map(|col| match record.get(col) {
                    None | Some(Value::Null) => Ok(f64::NAN),
                    Some(Value::Number(n)) => n.as_f64().ok_or_else(|| {
                        PaybackError::InvalidFeatures(format!(
                            "record {i}: column '{col}' is not representable as f64"
                        ))
                    }),
                    Some(Value::Bool(b)) => Ok(if *b { 1.0 } else { 0.0 }),
                    Some(other) => Err(PaybackError::InvalidFeatures(format!(
                        "record {i}: column '{col}' is not numeric: {other}"
                    ))),
                })
                .collect::<PaybackResult<Vec<f64>>>()?;
            rows.push(row);
        }

        FeatureTable::new(columns, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOANS: &str = r#"[
        {"annual_income": 52000, "debt_to_income_ratio": 0.21, "grade": "B", "employed": true},
        {"annual_income": 31000.5, "debt_to_income_ratio": 0.45, "grade": "C", "employed": false},
        {"annual_income": 87000, "debt_to_income_ratio": null, "grade": "B", "employed": true}
    ]"#;

    #[test]
    fn test_parse_records_preserves_column_order() {
        let ds = Dataset::from_json_str(LOANS).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(
            ds.column_names(),
            vec!["annual_income", "debt_to_income_ratio", "grade", "employed"]
        );
    }

    #[test]
    fn test_rejects_non_array_and_non_object() {
        assert!(Dataset::from_json_str(r#"{"a": 1}"#).is_err());
        let err = Dataset::from_json_str("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("record 0 is not an object"));
        assert!(Dataset::from_json_str("not json").is_err());
    }

    #[test]
    fn test_column_values() {
        let ds = Dataset::from_json_str(LOANS).unwrap();
        assert_eq!(ds.column_values("grade").unwrap(), vec!["B", "C", "B"]);
        // null cell skipped
        assert_eq!(ds.column_values("debt_to_income_ratio").unwrap().len(), 2);
        assert!(matches!(
            ds.column_values("purpose"),
            Err(PaybackError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_to_feature_table_selected_columns() {
        let ds = Dataset::from_json_str(LOANS).unwrap();
        let cols = vec![
            "annual_income".to_string(),
            "debt_to_income_ratio".to_string(),
            "employed".to_string(),
        ];
        let table = ds.to_feature_table(Some(&cols)).unwrap();
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.rows()[0], vec![52000.0, 0.21, 1.0]);
        assert_eq!(table.rows()[1][2], 0.0);
        assert!(table.rows()[2][1].is_nan());
    }

    #[test]
    fn test_to_feature_table_rejects_text() {
        let ds = Dataset::from_json_str(LOANS).unwrap();
        let err = ds.to_feature_table(None).unwrap_err();
        assert!(err.to_string().contains("'grade' is not numeric"));
    }

    #[test]
    fn test_load_from_disk() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), LOANS).unwrap();
        let ds = Dataset::load(tmp.path()).unwrap();
        assert_eq!(ds.len(), 3);
    }
}

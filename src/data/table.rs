//! Numeric feature table

use crate::error::{PaybackError, PaybackResult};

/// Feature matrix with named columns and ordered rows.
///
/// Every row has exactly one value per column. Column validation against
/// what a model expects is left to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureTable {
    /// Build a table, rejecting rows whose width differs from the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> PaybackResult<Self> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(PaybackError::InvalidFeatures(format!(
                "row {} has {} values but the table has {} columns",
                i,
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Build a table with generated column names `f0`, `f1`, ...
    pub fn from_rows(rows: Vec<Vec<f64>>) -> PaybackResult<Self> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let columns = (0..width).map(|i| format!("f{}", i)).collect();
        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

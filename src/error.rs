//! Error types shared by the loader, predictor and plotter

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading models or producing predictions
#[derive(Error, Debug)]
pub enum PaybackError {
    #[error("Model file not found: {}", path.display())]
    ModelNotFound { path: PathBuf },

    #[error("Failed to decode model artifact {}: {message}", path.display())]
    ModelDecode { path: PathBuf, message: String },

    #[error("Model has no usable prediction interface (loaded artifact: {kind})")]
    NoPredictionInterface { kind: String },

    #[error(
        "Model output has unexpected shape ({rows} x {cols}); cannot derive probabilities"
    )]
    UnexpectedOutputShape { rows: usize, cols: usize },

    #[error("Model returned {actual} predictions for {expected} rows")]
    OutputLength { expected: usize, actual: usize },

    #[error("Invalid feature table: {0}")]
    InvalidFeatures(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PaybackResult<T> = Result<T, PaybackError>;

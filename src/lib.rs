//! payback - model loading and threshold-aware prediction
//!
//! Utilities for a binary loan-payback classifier:
//! - [`paths::ensure_dir`] creates output directories
//! - [`classifier::load_model_and_threshold`] loads a persisted model and its
//!   decision threshold
//! - [`classifier::predict_probabilities`] and
//!   [`classifier::predict_with_threshold`] score a [`data::FeatureTable`]
//!   across model output conventions
//! - [`plot::plot_categorical_distribution`] charts one categorical column

pub mod classifier;
pub mod config;
pub mod data;
pub mod error;
pub mod paths;
pub mod plot;

pub use error::{PaybackError, PaybackResult};

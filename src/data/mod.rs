//! Tabular containers for model inputs
//!
//! - [`FeatureTable`]: named numeric columns with ordered rows, the input
//!   to every prediction call
//! - [`Dataset`]: raw JSON records, used for charts and converted into a
//!   `FeatureTable` before scoring

mod dataset;
mod table;

pub use dataset::{Dataset, Record};
pub use table::FeatureTable;

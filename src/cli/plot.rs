//! Plot command - chart one categorical column

use anyhow::{Context, Result};
use std::path::Path;

use payback::data::Dataset;
use payback::plot::{plot_categorical_distribution, PlotStyle};

/// Run the plot command
pub fn run(data: &Path, column: &str) -> Result<()> {
    let dataset = Dataset::load(data)
        .with_context(|| format!("Failed to read dataset from {}", data.display()))?;
    plot_categorical_distribution(&dataset, column, &PlotStyle::default())?;
    Ok(())
}

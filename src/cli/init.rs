//! Init command - write an example payback.toml

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use payback::config::{CONFIG_FILE_NAME, EXAMPLE_CONFIG};
use payback::paths::ensure_dir;

/// Run the init command
pub fn run(path: &Path) -> Result<()> {
    ensure_dir(path).with_context(|| format!("Failed to create {}", path.display()))?;

    let config_path = path.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        println!(
            "{} Config already exists at {}",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    std::fs::write(&config_path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );

    Ok(())
}

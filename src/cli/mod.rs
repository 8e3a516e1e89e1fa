//! CLI command definitions and handlers

mod init;
mod plot;
mod predict;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use payback::classifier::ArtifactFormat;
use payback::config::{load_config_file, load_project_config, PaybackConfig};

/// Parse and validate a probability threshold (0.0-1.0)
fn parse_threshold(s: &str) -> Result<f64, String> {
    let t: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if !(0.0..=1.0).contains(&t) {
        Err("threshold must be between 0 and 1".to_string())
    } else {
        Ok(t)
    }
}

/// Parse a model artifact format name
fn parse_model_format(s: &str) -> Result<ArtifactFormat, String> {
    match s {
        "native" => Ok(ArtifactFormat::Native),
        "xgboost-dump" => Ok(ArtifactFormat::XgboostDump),
        other => Err(format!(
            "unknown model format '{}' (expected native or xgboost-dump)",
            other
        )),
    }
}

/// payback - loan payback classifier utilities
#[derive(Parser, Debug)]
#[command(name = "payback")]
#[command(
    version,
    about = "Load a persisted classifier, score feature tables, and chart categorical columns",
    after_help = "\
Examples:
  payback init                                         Write an example payback.toml
  payback predict --features test.json                 Probabilities with the configured model
  payback predict --features test.json --labels        Add thresholded 0/1 labels
  payback predict --features test.json --format json -o outputs/preds.json
  payback plot --data train.json --column home_ownership"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Config file (default: ./payback.toml, then the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write an example payback.toml
    Init {
        /// Directory to write the config into
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Score a feature file with the persisted model
    Predict {
        /// JSON array of feature records
        #[arg(long)]
        features: PathBuf,

        /// Model artifact (overrides config)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Threshold metadata JSON (overrides config)
        #[arg(long)]
        threshold_file: Option<PathBuf>,

        /// Threshold used when the metadata is missing or malformed
        #[arg(long, value_parser = parse_threshold)]
        fallback_threshold: Option<f64>,

        /// Model artifact format
        #[arg(long, value_parser = parse_model_format)]
        model_format: Option<ArtifactFormat>,

        /// Feature columns in model order (default: keys of the first record)
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Also emit 0/1 labels from the decision threshold
        #[arg(long)]
        labels: bool,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Output file path (default: stdout); parent directories are created
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Chart the value counts of one categorical column
    Plot {
        /// JSON array of records
        #[arg(long)]
        data: PathBuf,

        /// Column to chart
        #[arg(long, short = 'c')]
        column: String,
    },
}

fn resolve_config(explicit: Option<&PathBuf>) -> Result<PaybackConfig> {
    match explicit {
        Some(path) => load_config_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path.display(), e)),
        None => {
            let cwd = std::env::current_dir()?;
            Ok(load_project_config(&cwd))
        }
    }
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { path } => init::run(&path),

        Commands::Predict {
            features,
            model,
            threshold_file,
            fallback_threshold,
            model_format,
            columns,
            labels,
            format,
            output,
        } => {
            let config = resolve_config(cli.config.as_ref())?;
            let mut model_config = config.model;
            if model.is_some() {
                model_config.path = model;
            }
            if threshold_file.is_some() {
                model_config.threshold_path = threshold_file;
            }
            if fallback_threshold.is_some() {
                model_config.fallback_threshold = fallback_threshold;
            }
            if model_format.is_some() {
                model_config.format = model_format;
            }

            predict::run(predict::PredictArgs {
                features,
                model: model_config,
                columns,
                labels,
                json: format == "json",
                output,
            })
        }

        Commands::Plot { data, column } => plot::run(&data, &column),
    }
}

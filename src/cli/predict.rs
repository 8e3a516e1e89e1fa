//! Predict command - score a feature file

use anyhow::{Context, Result};
use console::style;
use serde_json::json;
use std::path::PathBuf;

use payback::classifier::{
    apply_threshold, predict_probabilities, LoadedModel, ModelLoader, ThresholdSource,
};
use payback::config::ModelConfig;
use payback::data::Dataset;
use payback::paths::ensure_parent_dir;

pub struct PredictArgs {
    pub features: PathBuf,
    pub model: ModelConfig,
    pub columns: Vec<String>,
    pub labels: bool,
    pub json: bool,
    pub output: Option<PathBuf>,
}

/// Run the predict command
pub fn run(args: PredictArgs) -> Result<()> {
    let LoadedModel {
        model,
        threshold,
        threshold_source,
    } = ModelLoader::from_config(&args.model)
        .load()
        .context("Failed to load model")?;

    let dataset = Dataset::load(&args.features)
        .with_context(|| format!("Failed to read features from {}", args.features.display()))?;
    let columns = (!args.columns.is_empty()).then_some(args.columns.as_slice());
    let table = dataset.to_feature_table(columns)?;

    let probs = predict_probabilities(&model, &table)?;
    let labels = args.labels.then(|| apply_threshold(&probs, threshold));

    let source = match threshold_source {
        ThresholdSource::Metadata => "metadata",
        ThresholdSource::Fallback(_) => "fallback",
    };

    let rendered = if args.json {
        let mut body = json!({
            "capability": model.capability().to_string(),
            "threshold": threshold,
            "threshold_source": source,
            "probabilities": probs,
        });
        if let Some(labels) = &labels {
            body["labels"] = json!(labels);
        }
        serde_json::to_string_pretty(&body)? + "\n"
    } else {
        render_text(&probs, labels.as_deref(), threshold, source)
    };

    match &args.output {
        Some(path) => {
            ensure_parent_dir(path)
                .with_context(|| format!("Failed to create directory for {}", path.display()))?;
            std::fs::write(path, console::strip_ansi_codes(&rendered).as_bytes())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} Wrote {} predictions to {}",
                style("✓").green(),
                probs.len(),
                style(path.display()).cyan()
            );
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

fn render_text(probs: &[f64], labels: Option<&[u8]>, threshold: f64, source: &str) -> String {
    let mut out = format!(
        "{} {:.4} ({})\n",
        style("Threshold").bold(),
        threshold,
        source
    );
    out.push_str(&format!("{}\n", style("──────────────────────────").dim()));
    for (i, p) in probs.iter().enumerate() {
        match labels {
            Some(labels) => out.push_str(&format!("{:>6}  {:.6}  {}\n", i, p, labels[i])),
            None => out.push_str(&format!("{:>6}  {:.6}\n", i, p)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_text_with_labels() {
        let out = render_text(&[0.25, 0.75], Some(&[0, 1]), 0.5, "fallback");
        let plain = console::strip_ansi_codes(&out).to_string();
        assert!(plain.starts_with("Threshold 0.5000 (fallback)"));
        assert!(plain.contains("     0  0.250000  0"));
        assert!(plain.contains("     1  0.750000  1"));
    }

    #[test]
    fn test_render_text_probabilities_only() {
        let out = render_text(&[0.1], None, 0.42, "metadata");
        let plain = console::strip_ansi_codes(&out).to_string();
        assert!(plain.lines().last().unwrap().ends_with("0.100000"));
    }
}

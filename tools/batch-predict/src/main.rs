//! Batch Prediction Tool
//!
//! Reads one name per line from an input file and writes one line of
//! comma-joined nationality predictions per name, preserving input order.
//! Model-load failure aborts with a non-zero exit; a missing dictionary
//! only degrades to model-only predictions.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use kokuseki_core::{Classification, ClassifyOptions, Predictor};

/// CLI arguments
#[derive(Parser)]
#[command(name = "batch-predict")]
#[command(about = "Predict nationalities for a file of names")]
#[command(version)]
struct Cli {
    /// Input file, one name per line
    input: PathBuf,

    /// Model weights; config.json must sit beside this file
    #[arg(
        short,
        long,
        env = "KOKUSEKI_MODEL",
        default_value = "resources/production-model/model.safetensors"
    )]
    model: PathBuf,

    /// Dictionary of known names (JSON name -> labels mapping)
    #[arg(
        short,
        long,
        env = "KOKUSEKI_DICT",
        default_value = "resources/name2nats.json"
    )]
    dictionary: PathBuf,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// How many ranked labels to emit per name
    #[arg(long, default_value_t = 5)]
    top_n: usize,

    /// Answer known names from the dictionary instead of the model
    #[arg(long)]
    use_dict: bool,

    /// Forward-pass chunk size
    #[arg(long, default_value_t = 128)]
    mini_batch_size: usize,
}

fn render(results: &[Classification]) -> String {
    let mut out = String::new();
    for classification in results {
        let labels: Vec<&str> = classification
            .predictions
            .iter()
            .map(|p| p.label.as_str())
            .collect();
        out.push_str(&labels.join(","));
        out.push('\n');
    }
    out
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let predictor = Predictor::from_files(&cli.model, &cli.dictionary)
        .with_context(|| format!("cannot serve predictions with {}", cli.model.display()))?;

    let raw = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let names: Vec<String> = raw.lines().map(str::to_string).collect();
    info!(names = names.len(), "classifying");

    let opts = ClassifyOptions::new()
        .with_top_n(cli.top_n)
        .with_dict(cli.use_dict)
        .with_mini_batch_size(cli.mini_batch_size);
    let results = predictor.classify(&names, &opts)?;

    let rendered = render(&results);
    match &cli.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(out = %path.display(), "predictions written");
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kokuseki_core::Prediction;

    #[test]
    fn test_render_one_line_per_name() {
        let results = vec![
            Classification {
                name: "Kim Jong-un".into(),
                predictions: vec![
                    Prediction::new("Korean", 0.9),
                    Prediction::new("Chinese", 0.1),
                ],
            },
            Classification {
                name: "Angela Merkel".into(),
                predictions: vec![Prediction::new("German", 0.8)],
            },
        ];
        assert_eq!(render(&results), "Korean,Chinese\nGerman\n");
    }

    #[test]
    fn test_render_empty_prediction_list() {
        let results = vec![Classification {
            name: "X".into(),
            predictions: vec![],
        }];
        assert_eq!(render(&results), "\n");
    }
}

//! Training Tool
//!
//! Trains the character-level GRU nationality classifier on prepared splits
//! and writes `model.safetensors` + `config.json` for the serving side.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use kokuseki_core::ClassifierConfig;
use kokuseki_trainer::data::{build_vocab, collect_labels, load_dataset};
use kokuseki_trainer::trainer::{TrainConfig, Trainer};

/// CLI arguments
#[derive(Parser)]
#[command(name = "train")]
#[command(about = "Train the nationality classifier on prepared splits")]
#[command(version)]
struct Cli {
    /// Directory containing train.txt and dev.txt
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Where model.safetensors and config.json are written
    #[arg(long, default_value = "resources/production-model")]
    out_dir: PathBuf,

    /// Maximum number of epochs
    #[arg(long, default_value_t = 20)]
    max_epochs: usize,

    /// Mini-batch size; larger is faster but uses more memory
    #[arg(long, default_value_t = 128)]
    mini_batch_size: usize,

    /// Initial SGD learning rate
    #[arg(long, default_value_t = 0.1)]
    learning_rate: f64,

    /// Shuffle seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let train = load_dataset(cli.data_dir.join("train.txt"))
        .context("failed to load training split")?;
    let dev = load_dataset(cli.data_dir.join("dev.txt")).context("failed to load dev split")?;
    info!(train = train.len(), dev = dev.len(), "loaded splits");

    // Vocabulary and label set come from all data, so rare dev-only labels
    // still get an output row.
    let mut rows = train.clone();
    rows.extend(dev.iter().cloned());
    let arch = ClassifierConfig::new(collect_labels(&rows), build_vocab(&rows));
    info!(
        labels = arch.labels.len(),
        vocab = arch.vocab.len(),
        "built architecture config"
    );

    let config = TrainConfig::new()
        .with_max_epochs(cli.max_epochs)
        .with_mini_batch_size(cli.mini_batch_size)
        .with_learning_rate(cli.learning_rate)
        .with_seed(cli.seed);

    let report = Trainer::new(config).train(&train, &dev, arch, &cli.out_dir)?;
    info!(
        epochs = report.epochs_run,
        best_dev_loss = report.best_dev_loss,
        best_dev_accuracy = report.best_dev_accuracy,
        out = %cli.out_dir.display(),
        "training finished"
    );
    Ok(())
}

//! Dataset Preparation Tool
//!
//! Converts parallel `*.src` / `*.tgt` line files into the tab-separated
//! `token_sequence<TAB>label` format the trainer consumes. Malformed input
//! aborts with a line-numbered diagnostic and a non-zero exit.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use kokuseki_trainer::data::{PrepareOptions, prepare_split};

/// CLI arguments
#[derive(Parser)]
#[command(name = "prepare-dataset")]
#[command(about = "Convert parallel name/nationality files into training splits")]
#[command(version)]
struct Cli {
    /// Raw names, one per line
    #[arg(long)]
    src: PathBuf,

    /// Nationality labels, line-aligned with --src
    #[arg(long)]
    tgt: PathBuf,

    /// Output tab-separated split file
    #[arg(long)]
    out: PathBuf,

    /// Percentage of pairs to keep (sampled without replacement)
    #[arg(long, default_value_t = 100.0)]
    sample_pct: f64,

    /// Apply Korean-name augmentation (intended for the train split only)
    #[arg(long)]
    augment: bool,

    /// RNG seed for sampling and augmentation
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let opts = PrepareOptions {
        sample_pct: cli.sample_pct,
        augment_korean: cli.augment,
        seed: cli.seed,
    };
    let written = prepare_split(&cli.src, &cli.tgt, &cli.out, &opts)?;
    info!(written, out = %cli.out.display(), "dataset prepared");
    Ok(())
}

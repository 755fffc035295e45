//! # Dataset Preparation
//!
//! Converts parallel `*.src` (raw names) / `*.tgt` (nationality labels) line
//! files into the tab-separated `token_sequence<TAB>label` splits the trainer
//! consumes. Malformed records are fatal with line-numbered diagnostics;
//! a silently dropped pair would skew the label distribution unnoticed.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use oorandom::Rand32;

use kokuseki_core::tokenizer::convert;

/// Knobs for [`prepare_split`].
#[derive(Debug, Clone)]
pub struct PrepareOptions {
    /// Percentage of pairs to keep, sampled without replacement.
    pub sample_pct: f64,
    /// Korean-name augmentation: 50% chance to strip hyphens, 50% chance to
    /// swap the first/last name order. Train split only.
    pub augment_korean: bool,
    /// Seed for sampling and augmentation.
    pub seed: u64,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            sample_pct: 100.0,
            augment_korean: false,
            seed: 42,
        }
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(raw.trim_end().lines().map(str::to_string).collect())
}

fn augment_korean_name(name: &str, rng: &mut Rand32) -> String {
    let mut name = name.to_string();
    if rng.rand_float() > 0.5 {
        name = name.replace('-', "");
    }
    if rng.rand_float() > 0.5 {
        if let Some((last, first)) = name.split_once(' ') {
            name = format!("{first} {last}");
        }
    }
    name
}

/// Prepare one split: read parallel line files, optionally subsample and
/// augment, and write `convert(name)<TAB>label` rows.
///
/// Returns the number of rows written. Fails on a source/target length
/// mismatch or on any empty name/label, naming the offending line.
pub fn prepare_split(
    src: impl AsRef<Path>,
    tgt: impl AsRef<Path>,
    out: impl AsRef<Path>,
    opts: &PrepareOptions,
) -> Result<usize> {
    let src = src.as_ref();
    let tgt = tgt.as_ref();
    let names = read_lines(src)?;
    let labels = read_lines(tgt)?;
    ensure!(
        names.len() == labels.len(),
        "source/target mismatch: {} names in {} vs {} labels in {}",
        names.len(),
        src.display(),
        labels.len(),
        tgt.display(),
    );

    let mut rng = Rand32::new(opts.seed);
    let mut pairs = Vec::with_capacity(names.len());
    for (lineno, (name, label)) in names.into_iter().zip(labels).enumerate() {
        let name = name.trim().to_string();
        let label = label.trim().to_string();
        if name.is_empty() {
            bail!("{}:{}: empty name", src.display(), lineno + 1);
        }
        if label.is_empty() {
            bail!("{}:{}: empty label", tgt.display(), lineno + 1);
        }
        pairs.push((name, label));
    }

    if opts.sample_pct < 100.0 {
        let keep = ((pairs.len() as f64 * opts.sample_pct / 100.0) as usize).max(1);
        // Partial Fisher-Yates: the first `keep` slots are a uniform sample.
        for i in 0..keep.min(pairs.len().saturating_sub(1)) {
            let j = i + rng.rand_range(0..(pairs.len() - i) as u32) as usize;
            pairs.swap(i, j);
        }
        pairs.truncate(keep);
        tracing::info!(kept = pairs.len(), pct = opts.sample_pct, "subsampled pairs");
    }

    let out = out.as_ref();
    let mut file = fs::File::create(out)
        .with_context(|| format!("failed to create {}", out.display()))?;
    for (name, label) in &pairs {
        let name = if opts.augment_korean && label == "Korean" {
            augment_korean_name(name, &mut rng)
        } else {
            name.clone()
        };
        writeln!(file, "{}\t{}", convert(&name), label)?;
    }

    Ok(pairs.len())
}

/// Load a prepared split. Any line without exactly two non-empty
/// tab-separated columns is fatal with a line-numbered diagnostic.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<(String, String)>> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let mut rows = Vec::new();
    for (lineno, line) in raw.trim_end().lines().enumerate() {
        match line.split_once('\t') {
            Some((tokens, label))
                if !tokens.trim().is_empty()
                    && !label.trim().is_empty()
                    && !label.contains('\t') =>
            {
                rows.push((tokens.to_string(), label.trim().to_string()));
            }
            _ => bail!(
                "{}:{}: expected `tokens<TAB>label`, got {:?}",
                path.display(),
                lineno + 1,
                line
            ),
        }
    }
    Ok(rows)
}

/// Deterministic character vocabulary over the token sequences of a split
/// (sorted, deduplicated, token delimiter excluded).
pub fn build_vocab(rows: &[(String, String)]) -> Vec<char> {
    let mut chars: std::collections::BTreeSet<char> = std::collections::BTreeSet::new();
    for (tokens, _) in rows {
        chars.extend(tokens.chars().filter(|c| *c != ' '));
    }
    chars.into_iter().collect()
}

/// Deterministic sorted label set over a split.
pub fn collect_labels(rows: &[(String, String)]) -> Vec<String> {
    let mut labels: std::collections::BTreeSet<&str> = std::collections::BTreeSet::new();
    for (_, label) in rows {
        labels.insert(label);
    }
    labels.into_iter().map(str::to_string).collect()
}

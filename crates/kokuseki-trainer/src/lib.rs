//! # Kokuseki Trainer
//!
//! Offline workflows for the nationality classifier: converting parallel
//! name/nationality line files into tab-separated training splits, and the
//! mini-batch SGD loop with plateau-based learning-rate annealing that
//! produces the model artifacts `kokuseki-core` serves.

pub mod data;
pub mod trainer;

pub use data::{PrepareOptions, build_vocab, collect_labels, load_dataset, prepare_split};
pub use trainer::{AnnealSchedule, Step, TrainConfig, TrainReport, Trainer};

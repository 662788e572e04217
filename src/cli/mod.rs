//! Command-line parsing for the heart-disease risk engine.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the modeling/scoring code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "cardiorisk", version, about = "Heart-disease risk scoring engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Train a classifier (grid search + cross-validation) and save the artifact.
    Train(TrainArgs),
    /// Score a single record from a JSON file.
    Predict(PredictArgs),
    /// Print the feature schema as a table.
    Schema,
}

/// Options for a training run.
#[derive(Debug, Parser, Clone)]
pub struct TrainArgs {
    /// CSV dataset with the 13 feature columns plus `target`.
    /// When omitted, a synthetic dataset is generated.
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Output directory for the model artifact.
    #[arg(short = 'o', long, default_value = "model")]
    pub out: PathBuf,

    /// Number of synthetic records to generate (ignored with --data).
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub sample_count: usize,

    /// Random seed for data generation, splitting, and tree fitting.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Fraction of records held out for evaluation.
    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,

    /// Number of cross-validation folds.
    #[arg(long, default_value_t = 5)]
    pub folds: usize,

    /// Grid axis: ensemble sizes.
    #[arg(long, value_delimiter = ',', default_values_t = [50, 100])]
    pub n_estimators: Vec<usize>,

    /// Grid axis: maximum tree depths (0 = unlimited).
    #[arg(long, value_delimiter = ',', default_values_t = [10, 0])]
    pub max_depths: Vec<usize>,

    /// Grid axis: minimum samples required to split a node.
    #[arg(long, value_delimiter = ',', default_values_t = [2, 5])]
    pub min_samples_splits: Vec<usize>,

    /// Grid axis: minimum samples required in each leaf.
    #[arg(long, value_delimiter = ',', default_values_t = [1, 2])]
    pub min_samples_leafs: Vec<usize>,
}

/// Options for scoring a single record.
#[derive(Debug, Parser)]
pub struct PredictArgs {
    /// JSON file holding one record (an object with the 13 feature keys).
    #[arg(long, value_name = "JSON")]
    pub input: PathBuf,

    /// Model artifact directory produced by `cardiorisk train`.
    #[arg(short = 'm', long, default_value = "model")]
    pub model: PathBuf,

    /// Use the rule-based scorer instead of a trained model.
    #[arg(long)]
    pub rule: bool,

    /// Also enforce the advisory numeric ranges.
    #[arg(long)]
    pub strict: bool,
}

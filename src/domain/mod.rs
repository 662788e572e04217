//! Shared domain types.
//!
//! This module defines:
//!
//! - the validated feature record (`FeatureRecord`)
//! - fitted state (`NormalizationParameters`, `Hyperparameters`)
//! - scoring and evaluation outputs (`RiskResult`, `EvaluationReport`)
//! - the training run configuration (`TrainConfig`)

pub mod types;

pub use types::*;

//! Classifier training orchestration.
//!
//! Responsibilities:
//!
//! - enumerate the hyperparameter grid in deterministic order
//! - evaluate each candidate with 5-fold cross-validated ROC-AUC (parallel)
//! - select the best candidate (arg-max, ties to the first enumerated)
//! - refit the winning candidate on the full training split

pub mod grid;
pub mod trainer;

pub use grid::*;
pub use trainer::*;

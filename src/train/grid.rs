//! Hyperparameter grid enumeration.
//!
//! The grid is a plain cartesian product, enumerated in a fixed axis order
//! (n_estimators, max_depth, min_samples_split, min_samples_leaf). The
//! enumeration index doubles as the tie-breaker during selection, so the
//! order here is part of the training contract.

use crate::domain::{Hyperparameters, TrainConfig};
use crate::error::AppError;

/// Enumerate all grid candidates for a training configuration.
pub fn hyperparameter_grid(config: &TrainConfig) -> Result<Vec<Hyperparameters>, AppError> {
    if config.n_estimators.is_empty()
        || config.max_depths.is_empty()
        || config.min_samples_splits.is_empty()
        || config.min_samples_leafs.is_empty()
    {
        return Err(AppError::precondition("hyperparameter grid has an empty axis"));
    }
    if config.n_estimators.iter().any(|&n| n == 0) {
        return Err(AppError::precondition("n_estimators values must be >= 1"));
    }
    if config.min_samples_splits.iter().any(|&n| n < 2) {
        return Err(AppError::precondition("min_samples_split values must be >= 2"));
    }
    if config.min_samples_leafs.iter().any(|&n| n == 0) {
        return Err(AppError::precondition("min_samples_leaf values must be >= 1"));
    }

    let mut out = Vec::new();
    for &n_estimators in &config.n_estimators {
        for &max_depth in &config.max_depths {
            for &min_samples_split in &config.min_samples_splits {
                for &min_samples_leaf in &config.min_samples_leafs {
                    out.push(Hyperparameters {
                        n_estimators,
                        max_depth,
                        min_samples_split,
                        min_samples_leaf,
                    });
                }
            }
        }
    }
    Ok(out)
}

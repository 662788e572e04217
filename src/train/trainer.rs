//! Grid search with cross-validated model selection.
//!
//! Each grid candidate is scored by k-fold cross-validated ROC-AUC and the
//! candidates are evaluated in parallel. Selection is a deterministic
//! reduction: maximum mean AUC, ties broken by the first-enumerated
//! candidate. Fold membership and per-fold forest seeds are derived from the
//! caller seed before the fan-out, so two runs with identical data and seed
//! select identical hyperparameters and fit identical forests.

use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::domain::Hyperparameters;
use crate::error::AppError;
use crate::eval::roc_auc;
use crate::forest::RandomForest;

/// One scored grid candidate.
#[derive(Debug, Clone)]
pub struct CvResult {
    pub hyper: Hyperparameters,
    /// Mean ROC-AUC over folds where the metric was defined.
    pub mean_auc: f64,
}

/// Output of a completed grid search.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    /// The winning candidate refitted on the full training split.
    pub classifier: RandomForest,
    pub best: Hyperparameters,
    pub best_cv_auc: f64,
    /// All candidates in enumeration order (for diagnostics).
    pub cv_results: Vec<CvResult>,
}

/// Run the grid search and refit the winner.
///
/// `x` rows must already be preprocessed (standardized numeric columns in
/// canonical order).
pub fn train(
    x: &[Vec<f64>],
    y: &[u8],
    feature_names: &[String],
    grid: &[Hyperparameters],
    folds: usize,
    seed: u64,
) -> Result<TrainOutcome, AppError> {
    if x.is_empty() {
        return Err(AppError::precondition("cannot train on an empty dataset"));
    }
    if x.len() != y.len() {
        return Err(AppError::precondition(
            "feature matrix and label vector must have equal lengths",
        ));
    }
    let n_pos = y.iter().filter(|&&l| l == 1).count();
    if n_pos == 0 || n_pos == y.len() {
        return Err(AppError::precondition(
            "training data contains a single class; both labels are required",
        ));
    }
    if grid.is_empty() {
        return Err(AppError::precondition("hyperparameter grid is empty"));
    }
    if folds < 2 {
        return Err(AppError::precondition("cross-validation requires at least 2 folds"));
    }
    if x.len() < folds {
        return Err(AppError::precondition(format!(
            "cannot split {} samples into {folds} folds",
            x.len()
        )));
    }

    let fold_assignment = assign_folds(x.len(), folds, seed);

    // Evaluate candidates independently; per-fold seeds are shared across
    // candidates so each sees the same resampling conditions.
    let scored: Vec<(usize, f64)> = grid
        .par_iter()
        .enumerate()
        .map(|(idx, hyper)| {
            let score = cv_score(x, y, feature_names, hyper, &fold_assignment, folds, seed)?;
            Ok((idx, score))
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    // Deterministic selection: maximum mean AUC, ties to the lowest index.
    let mut best_idx = scored[0].0;
    let mut best_score = scored[0].1;
    for &(idx, score) in &scored[1..] {
        // An undefined (NaN) incumbent loses to any defined score.
        if score > best_score || (best_score.is_nan() && !score.is_nan()) {
            best_idx = idx;
            best_score = score;
        }
    }
    if !best_score.is_finite() {
        return Err(AppError::precondition(
            "cross-validation produced no defined ROC-AUC for any candidate",
        ));
    }

    let best = grid[best_idx].clone();
    let classifier = RandomForest::fit(x, y, feature_names.to_vec(), &best, seed)?;

    let cv_results = grid
        .iter()
        .zip(scored.iter())
        .map(|(hyper, &(_, mean_auc))| CvResult {
            hyper: hyper.clone(),
            mean_auc,
        })
        .collect();

    Ok(TrainOutcome {
        classifier,
        best,
        best_cv_auc: best_score,
        cv_results,
    })
}

/// Shuffle indices once and deal them into `folds` round-robin buckets.
fn assign_folds(n: usize, folds: usize, seed: u64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let mut assignment = vec![0usize; n];
    for (pos, &idx) in order.iter().enumerate() {
        assignment[idx] = pos % folds;
    }
    assignment
}

/// Mean ROC-AUC over folds where the metric is defined.
///
/// A fold whose validation part is single-class has no defined AUC and is
/// skipped; NaN propagates to the caller when every fold is undefined, where
/// it loses every comparison and is finally rejected.
fn cv_score(
    x: &[Vec<f64>],
    y: &[u8],
    feature_names: &[String],
    hyper: &Hyperparameters,
    fold_assignment: &[usize],
    folds: usize,
    seed: u64,
) -> Result<f64, AppError> {
    let mut sum = 0.0;
    let mut defined = 0usize;

    for fold in 0..folds {
        let mut x_train = Vec::new();
        let mut y_train = Vec::new();
        let mut x_val = Vec::new();
        let mut y_val = Vec::new();
        for i in 0..x.len() {
            if fold_assignment[i] == fold {
                x_val.push(x[i].clone());
                y_val.push(y[i]);
            } else {
                x_train.push(x[i].clone());
                y_train.push(y[i]);
            }
        }

        // A fold whose training part lost one class entirely cannot be fit;
        // with shuffled folds this only happens on pathological data.
        let pos = y_train.iter().filter(|&&l| l == 1).count();
        if pos == 0 || pos == y_train.len() {
            continue;
        }

        let fold_seed = seed.wrapping_add(fold as u64 + 1);
        let forest = RandomForest::fit(&x_train, &y_train, feature_names.to_vec(), hyper, fold_seed)?;
        let probas: Vec<f64> = x_val.iter().map(|row| forest.predict_proba(row)).collect();

        if let Some(auc) = roc_auc(&probas, &y_val) {
            sum += auc;
            defined += 1;
        }
    }

    if defined == 0 {
        return Ok(f64::NAN);
    }
    Ok(sum / defined as f64)
}

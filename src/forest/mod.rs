//! Tree-ensemble classifier: bootstrap-aggregated CART trees.
//!
//! Responsibilities:
//!
//! - grow `n_estimators` trees over bootstrap resamples (parallel)
//! - counter label imbalance with balanced-subsample class weighting
//! - average tree probabilities at prediction time
//! - expose mean-decrease-in-impurity feature importances
//!
//! Determinism: every tree's RNG seed is derived from the forest seed and the
//! tree index before the parallel fan-out, so the fitted forest is identical
//! for a fixed seed regardless of thread scheduling.

use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::Hyperparameters;
use crate::error::AppError;

pub mod tree;

pub use tree::{DecisionTree, Node, TreeOptions};

/// Odd multiplier decorrelating per-tree seeds derived from the forest seed.
const SEED_STRIDE: u64 = 0x9e37_79b9_7f4a_7c15;

/// A fitted random forest, immutable after creation.
///
/// `feature_names` records the exact column ordering the forest was trained
/// on; the model store refuses to load a forest whose ordering disagrees with
/// the current schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    pub hyper: Hyperparameters,
    pub seed: u64,
    pub feature_names: Vec<String>,
}

impl RandomForest {
    /// Fit a forest over row vectors `x` with binary labels `y`.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[u8],
        feature_names: Vec<String>,
        hyper: &Hyperparameters,
        seed: u64,
    ) -> Result<Self, AppError> {
        if x.is_empty() {
            return Err(AppError::precondition("cannot fit a forest on an empty dataset"));
        }
        if x.len() != y.len() {
            return Err(AppError::precondition(
                "feature matrix and label vector must have equal lengths",
            ));
        }
        if hyper.n_estimators == 0 {
            return Err(AppError::precondition("n_estimators must be >= 1"));
        }
        let n_features = x[0].len();
        if feature_names.len() != n_features {
            return Err(AppError::precondition(
                "feature name list must match the matrix width",
            ));
        }

        // sqrt(n_features) candidate features per node, the usual forest default.
        let max_features = (n_features as f64).sqrt().floor().max(1.0) as usize;
        let opts = TreeOptions {
            max_depth: hyper.max_depth,
            min_samples_split: hyper.min_samples_split,
            min_samples_leaf: hyper.min_samples_leaf,
            max_features,
        };

        let tree_seeds: Vec<u64> = (0..hyper.n_estimators)
            .map(|i| seed.wrapping_add((i as u64).wrapping_mul(SEED_STRIDE)))
            .collect();

        let trees: Result<Vec<DecisionTree>, AppError> = tree_seeds
            .par_iter()
            .map(|&tree_seed| {
                let mut rng = StdRng::seed_from_u64(tree_seed);
                let sample = bootstrap(x.len(), &mut rng);
                let weights = balanced_subsample_weights(&sample, y);
                DecisionTree::fit(x, y, &sample, &weights, &opts, &mut rng)
            })
            .collect();

        Ok(RandomForest {
            trees: trees?,
            hyper: hyper.clone(),
            seed,
            feature_names,
        })
    }

    /// Mean positive-class probability across all trees.
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict_proba(row)).sum();
        sum / self.trees.len() as f64
    }

    /// Hard label: positive iff the mean probability exceeds 0.5.
    pub fn predict(&self, row: &[f64]) -> u8 {
        u8::from(self.predict_proba(row) > 0.5)
    }

    /// Mean decrease in impurity per feature, averaged over trees and
    /// normalized to sum to 1 across all features.
    pub fn feature_importances(&self) -> Vec<f64> {
        let n_features = self.feature_names.len();
        let mut acc = vec![0.0; n_features];
        for tree in &self.trees {
            for (a, &v) in acc.iter_mut().zip(tree.importance()) {
                *a += v;
            }
        }
        let total: f64 = acc.iter().sum();
        if total > 0.0 {
            for v in &mut acc {
                *v /= total;
            }
        }
        acc
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

/// Draw a bootstrap sample (n indices with replacement).
fn bootstrap(n: usize, rng: &mut StdRng) -> Vec<usize> {
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}

/// Balanced-subsample weights: within this tree's bootstrap sample, class `c`
/// gets weight `n / (n_classes * count_c)`, so a minority class contributes
/// as much total weight as the majority.
fn balanced_subsample_weights(sample: &[usize], y: &[u8]) -> Vec<f64> {
    let n = sample.len() as f64;
    let pos = sample.iter().filter(|&&i| y[i] == 1).count() as f64;
    let neg = n - pos;

    let w_pos = if pos > 0.0 { n / (2.0 * pos) } else { 0.0 };
    let w_neg = if neg > 0.0 { n / (2.0 * neg) } else { 0.0 };

    sample
        .iter()
        .map(|&i| if y[i] == 1 { w_pos } else { w_neg })
        .collect()
}

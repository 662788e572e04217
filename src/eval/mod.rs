//! Held-out evaluation: accuracy, ROC-AUC, confusion matrix, importances.
//!
//! Metrics with a zero denominator are reported as `None` (the explicit
//! undefined marker), never coerced to 0 or 1. That includes AUC when the
//! held-out split contains a single class.

use crate::domain::{ConfusionMatrix, EvaluationReport, FeatureImportance};
use crate::error::AppError;
use crate::forest::RandomForest;

/// Fraction of exact label matches.
pub fn accuracy(predictions: &[u8], labels: &[u8]) -> f64 {
    let hits = predictions
        .iter()
        .zip(labels.iter())
        .filter(|(p, l)| p == l)
        .count();
    hits as f64 / labels.len() as f64
}

/// Area under the ROC curve via the rank statistic (Mann-Whitney U), with
/// tied scores receiving average ranks.
///
/// Returns `None` when either class is absent.
pub fn roc_auc(scores: &[f64], labels: &[u8]) -> Option<f64> {
    let n_pos = labels.iter().filter(|&&l| l == 1).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].partial_cmp(&scores[b]).unwrap_or(std::cmp::Ordering::Equal));

    // Average ranks over tie groups, then sum positive ranks.
    let mut rank_sum_pos = 0.0;
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        // 1-based ranks i+1 ..= j+1 share the average.
        let avg_rank = (i + 1 + j + 1) as f64 / 2.0;
        for &idx in &order[i..=j] {
            if labels[idx] == 1 {
                rank_sum_pos += avg_rank;
            }
        }
        i = j + 1;
    }

    let u = rank_sum_pos - (n_pos * (n_pos + 1)) as f64 / 2.0;
    Some(u / (n_pos as f64 * n_neg as f64))
}

/// 2x2 confusion counts.
pub fn confusion(predictions: &[u8], labels: &[u8]) -> ConfusionMatrix {
    let mut cm = ConfusionMatrix {
        true_negatives: 0,
        false_positives: 0,
        false_negatives: 0,
        true_positives: 0,
    };
    for (&p, &l) in predictions.iter().zip(labels.iter()) {
        match (l, p) {
            (0, 0) => cm.true_negatives += 1,
            (0, _) => cm.false_positives += 1,
            (_, 0) => cm.false_negatives += 1,
            _ => cm.true_positives += 1,
        }
    }
    cm
}

/// Evaluate a fitted classifier on a held-out split.
pub fn evaluate(
    forest: &RandomForest,
    x_test: &[Vec<f64>],
    y_test: &[u8],
) -> Result<EvaluationReport, AppError> {
    if x_test.is_empty() || x_test.len() != y_test.len() {
        return Err(AppError::precondition(
            "evaluation requires a non-empty test split with matching labels",
        ));
    }

    let probas: Vec<f64> = x_test.iter().map(|row| forest.predict_proba(row)).collect();
    let predictions: Vec<u8> = probas.iter().map(|&p| u8::from(p > 0.5)).collect();

    let cm = confusion(&predictions, y_test);
    Ok(EvaluationReport {
        accuracy: accuracy(&predictions, y_test),
        auc: roc_auc(&probas, y_test),
        sensitivity: cm.sensitivity(),
        specificity: cm.specificity(),
        confusion: cm,
    })
}

/// Per-feature importance weights, sorted descending, summing to 1.0.
pub fn feature_importance(forest: &RandomForest) -> Vec<FeatureImportance> {
    let mut out: Vec<FeatureImportance> = forest
        .feature_names
        .iter()
        .zip(forest.feature_importances())
        .map(|(name, importance)| FeatureImportance {
            feature: name.clone(),
            importance,
        })
        .collect();
    out.sort_by(|a, b| b.importance.partial_cmp(&a.importance).unwrap_or(std::cmp::Ordering::Equal));
    out
}

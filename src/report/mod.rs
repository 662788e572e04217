//! Terminal formatting for training summaries, risk results, and the
//! published feature documentation table.
//!
//! Formatting stays in one place so the scoring/training code remains clean
//! and output changes are localized.

use crate::domain::{EvaluationReport, FeatureImportance, Hyperparameters, RiskResult};
use crate::schema::{self, FieldKind};

/// Render a metric that may be undefined.
fn metric(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.4}"),
        None => "undefined".to_string(),
    }
}

/// Format the full training run summary.
pub fn format_train_summary(
    best: &Hyperparameters,
    best_cv_auc: f64,
    report: &EvaluationReport,
    n_train: usize,
    n_test: usize,
) -> String {
    let mut out = String::new();

    out.push_str("=== cardiorisk - training summary ===\n");
    out.push_str(&format!("Samples: {n_train} train / {n_test} test\n"));
    out.push_str(&format!(
        "Best parameters: n_estimators={}, max_depth={}, min_samples_split={}, min_samples_leaf={}\n",
        best.n_estimators,
        best.max_depth.map_or_else(|| "none".to_string(), |d| d.to_string()),
        best.min_samples_split,
        best.min_samples_leaf,
    ));
    out.push_str(&format!("Best cross-validation ROC-AUC: {best_cv_auc:.4}\n"));
    out.push('\n');
    out.push_str(&format_evaluation(report));
    out
}

/// Format the held-out evaluation metrics.
pub fn format_evaluation(report: &EvaluationReport) -> String {
    let cm = &report.confusion;
    let mut out = String::new();
    out.push_str(&format!("Accuracy:    {:.4}\n", report.accuracy));
    out.push_str(&format!("ROC-AUC:     {}\n", metric(report.auc)));
    out.push_str(&format!("Sensitivity: {}\n", metric(report.sensitivity)));
    out.push_str(&format!("Specificity: {}\n", metric(report.specificity)));
    out.push_str("Confusion matrix (rows: actual 0/1, cols: predicted 0/1):\n");
    out.push_str(&format!(
        "  [{:>5} {:>5}]\n  [{:>5} {:>5}]\n",
        cm.true_negatives, cm.false_positives, cm.false_negatives, cm.true_positives
    ));
    out
}

/// Format the descending feature-importance ranking.
pub fn format_importance(ranking: &[FeatureImportance]) -> String {
    let mut out = String::new();
    out.push_str("Feature importance:\n");
    for entry in ranking {
        out.push_str(&format!("  {:<10} {:.4}\n", entry.feature, entry.importance));
    }
    out
}

/// Format one risk decision.
pub fn format_risk_result(result: &RiskResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("Prediction:  {}\n", result.prediction));
    out.push_str(&format!("Probability: {:.4}\n", result.probability));
    if let Some(score) = result.risk_score {
        out.push_str(&format!("Risk score:  {score}\n"));
    }
    out.push_str(&format!("Message:     {}\n", result.message));
    out
}

/// Render the feature documentation table a transport layer would publish.
pub fn format_schema_table() -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<10} {:<12} {:<18} description\n", "field", "type", "domain"));
    for spec in schema::FIELDS.iter() {
        let (kind, domain) = match spec.kind {
            FieldKind::Numeric { min, max } => ("numeric", format!("[{min}, {max}]")),
            FieldKind::Categorical { domain } => {
                let values: Vec<String> = domain.iter().map(|v| v.to_string()).collect();
                ("categorical", format!("{{{}}}", values.join(", ")))
            }
        };
        out.push_str(&format!(
            "{:<10} {:<12} {:<18} {}\n",
            spec.name, kind, domain, spec.description
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConfusionMatrix;

    #[test]
    fn undefined_metrics_render_as_undefined() {
        let report = EvaluationReport {
            accuracy: 1.0,
            auc: None,
            sensitivity: Some(1.0),
            specificity: None,
            confusion: ConfusionMatrix {
                true_negatives: 0,
                false_positives: 0,
                false_negatives: 0,
                true_positives: 4,
            },
        };
        let text = format_evaluation(&report);
        assert!(text.contains("Specificity: undefined"));
        assert!(text.contains("Sensitivity: 1.0000"));
    }

    #[test]
    fn schema_table_lists_every_field() {
        let table = format_schema_table();
        for spec in schema::FIELDS.iter() {
            assert!(table.contains(spec.name));
        }
        assert!(table.contains("{0, 1, 2, 3}"));
    }
}

//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during training and scoring
//! - exported to JSON artifacts
//! - reloaded later for serving

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::schema::NUMERIC_FIELDS;

/// The untyped mapping handed over by a transport layer.
///
/// The core assumes the 13 keys have already been demultiplexed from whatever
/// wire format was used; the validator turns this into a `FeatureRecord`.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// A validated clinical feature record.
///
/// Every field is present, coerced to its canonical type, and within its
/// declared domain. Construction goes through `validate::validate`; the
/// struct itself carries no invariants beyond its types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub age: f64,
    pub sex: u8,
    pub cp: u8,
    pub trestbps: f64,
    pub chol: f64,
    pub fbs: u8,
    pub restecg: u8,
    pub thalach: f64,
    pub exang: u8,
    pub oldpeak: f64,
    pub slope: u8,
    pub ca: u8,
    pub thal: u8,
}

impl FeatureRecord {
    /// Value of a field by schema name, as `f64` regardless of kind.
    ///
    /// The preprocessor uses this to join schema order with record fields by
    /// name, so column order can never drift silently.
    pub fn value(&self, name: &str) -> Option<f64> {
        let v = match name {
            "age" => self.age,
            "sex" => f64::from(self.sex),
            "cp" => f64::from(self.cp),
            "trestbps" => self.trestbps,
            "chol" => self.chol,
            "fbs" => f64::from(self.fbs),
            "restecg" => f64::from(self.restecg),
            "thalach" => self.thalach,
            "exang" => f64::from(self.exang),
            "oldpeak" => self.oldpeak,
            "slope" => f64::from(self.slope),
            "ca" => f64::from(self.ca),
            "thal" => f64::from(self.thal),
            _ => return None,
        };
        Some(v)
    }
}

/// A feature record with its binary risk label (training data).
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledRecord {
    pub record: FeatureRecord,
    pub label: u8,
}

/// Per-numeric-feature mean and standard deviation, fitted once over a
/// training split and read-only afterwards.
///
/// Keyed by field name (parallel vectors in `NUMERIC_FIELDS` order) so the
/// transform can look parameters up by name instead of trusting positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationParameters {
    pub fields: Vec<String>,
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

impl NormalizationParameters {
    /// Mean and standard deviation for a numeric field, by name.
    pub fn for_field(&self, name: &str) -> Option<(f64, f64)> {
        let i = self.fields.iter().position(|f| f == name)?;
        Some((self.means[i], self.stds[i]))
    }

    /// Check that parameters cover exactly the schema's numeric fields.
    pub fn check_schema(&self) -> Result<(), AppError> {
        if self.fields != NUMERIC_FIELDS.map(String::from).to_vec() {
            return Err(AppError::artifact(format!(
                "normalization parameters cover fields {:?}, expected {:?}",
                self.fields, NUMERIC_FIELDS
            )));
        }
        if self.means.len() != self.fields.len() || self.stds.len() != self.fields.len() {
            return Err(AppError::artifact(
                "normalization parameter vectors have mismatched lengths",
            ));
        }
        Ok(())
    }
}

/// Forest hyperparameters (one grid candidate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Number of trees in the ensemble.
    pub n_estimators: usize,
    /// Maximum tree depth; `None` grows trees until purity/leaf limits stop them.
    pub max_depth: Option<usize>,
    /// Minimum number of samples required to split an internal node.
    pub min_samples_split: usize,
    /// Minimum number of samples required in each leaf.
    pub min_samples_leaf: usize,
}

/// One risk decision for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    /// 1 = high risk, 0 = low risk.
    pub prediction: u8,
    /// Probability of heart disease, in [0, 1].
    pub probability: f64,
    /// Fixed human-readable message keyed by the prediction.
    pub message: String,
    /// Diagnostic count of heuristic risk factors (rule-based scorer only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<u32>,
}

/// 2x2 confusion matrix counts for the binary task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_positives: usize,
}

impl ConfusionMatrix {
    /// Sensitivity (true-positive rate); `None` when there are no positives.
    pub fn sensitivity(&self) -> Option<f64> {
        let denom = self.true_positives + self.false_negatives;
        if denom == 0 {
            None
        } else {
            Some(self.true_positives as f64 / denom as f64)
        }
    }

    /// Specificity (true-negative rate); `None` when there are no negatives.
    pub fn specificity(&self) -> Option<f64> {
        let denom = self.true_negatives + self.false_positives;
        if denom == 0 {
            None
        } else {
            Some(self.true_negatives as f64 / denom as f64)
        }
    }
}

/// Held-out evaluation metrics for a training run.
///
/// `None` is the explicit "undefined" marker (serialized as JSON `null`);
/// undefined metrics are never coerced to 0 or 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub accuracy: f64,
    pub auc: Option<f64>,
    pub sensitivity: Option<f64>,
    pub specificity: Option<f64>,
    pub confusion: ConfusionMatrix,
}

/// One entry of the feature-importance ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// A full training run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Optional CSV dataset; when absent, a synthetic dataset is generated.
    pub data_path: Option<PathBuf>,
    /// Output directory for the artifact pair plus metrics.
    pub out_dir: PathBuf,
    /// Synthetic dataset size (ignored when `data_path` is set).
    pub sample_count: usize,
    /// Seed controlling dataset generation, splitting, and tree fitting.
    pub seed: u64,
    /// Held-out fraction for evaluation.
    pub test_fraction: f64,
    /// Number of cross-validation folds.
    pub folds: usize,

    /// Grid axis: ensemble sizes.
    pub n_estimators: Vec<usize>,
    /// Grid axis: maximum depths (`None` = unlimited).
    pub max_depths: Vec<Option<usize>>,
    /// Grid axis: minimum samples to split.
    pub min_samples_splits: Vec<usize>,
    /// Grid axis: minimum samples per leaf.
    pub min_samples_leafs: Vec<usize>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            out_dir: PathBuf::from("model"),
            sample_count: 1000,
            seed: 42,
            test_fraction: 0.2,
            folds: 5,
            n_estimators: vec![50, 100],
            max_depths: vec![Some(10), None],
            min_samples_splits: vec![2, 5],
            min_samples_leafs: vec![1, 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    fn low_risk_record() -> FeatureRecord {
        FeatureRecord {
            age: 25.0,
            sex: 0,
            cp: 0,
            trestbps: 105.0,
            chol: 150.0,
            fbs: 0,
            restecg: 0,
            thalach: 185.0,
            exang: 0,
            oldpeak: 0.0,
            slope: 2,
            ca: 0,
            thal: 2,
        }
    }

    #[test]
    fn record_value_covers_every_schema_field() {
        let r = low_risk_record();
        for spec in schema::FIELDS.iter() {
            assert!(r.value(spec.name).is_some(), "missing accessor for {}", spec.name);
        }
        assert!(r.value("unknown").is_none());
    }

    #[test]
    fn confusion_metrics_undefined_on_zero_denominator() {
        let cm = ConfusionMatrix {
            true_negatives: 0,
            false_positives: 0,
            false_negatives: 2,
            true_positives: 8,
        };
        assert_eq!(cm.specificity(), None);
        assert_eq!(cm.sensitivity(), Some(0.8));
    }

    #[test]
    fn normalization_lookup_is_by_name() {
        let params = NormalizationParameters {
            fields: NUMERIC_FIELDS.map(String::from).to_vec(),
            means: vec![50.0, 130.0, 220.0, 150.0, 1.0],
            stds: vec![10.0, 15.0, 40.0, 20.0, 1.0],
        };
        assert_eq!(params.for_field("chol"), Some((220.0, 40.0)));
        assert_eq!(params.for_field("bmi"), None);
        assert!(params.check_schema().is_ok());
    }
}

//! Feature schema: the 13 recognized clinical fields.
//!
//! The schema is the single source of truth for:
//!
//! - the canonical feature column order (training and inference must agree)
//! - which fields are continuous vs categorical
//! - the valid domain of each field (enumerated codes / plausible ranges)
//! - the human-readable documentation a transport layer can render
//!
//! Everything downstream (validation, preprocessing, the classifier's stored
//! feature ordering) keys off this table rather than duplicating it.

use serde::Serialize;

/// Number of clinical features in a complete record.
pub const FEATURE_COUNT: usize = 13;

/// Semantic type and valid domain of a field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum FieldKind {
    /// Continuous measurement with a documented plausible range.
    ///
    /// Validation always requires the value to be finite and non-negative;
    /// the range is enforced only in strict mode and otherwise serves as
    /// client-facing documentation.
    Numeric { min: f64, max: f64 },
    /// Small-cardinality integer code from an enumerated table.
    Categorical { domain: &'static [u8] },
}

/// One entry in the published feature table.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub description: &'static str,
}

const BINARY: &[u8] = &[0, 1];
const FOUR_LEVEL: &[u8] = &[0, 1, 2, 3];
const THREE_LEVEL: &[u8] = &[0, 1, 2];

/// The 13 fields in canonical column order.
///
/// This order is the one the classifier is trained on and must never change
/// between training and inference.
pub static FIELDS: [FieldSpec; FEATURE_COUNT] = [
    FieldSpec {
        name: "age",
        kind: FieldKind::Numeric { min: 0.0, max: 150.0 },
        description: "Age in years",
    },
    FieldSpec {
        name: "sex",
        kind: FieldKind::Categorical { domain: BINARY },
        description: "Gender (1 = male; 0 = female)",
    },
    FieldSpec {
        name: "cp",
        kind: FieldKind::Categorical { domain: FOUR_LEVEL },
        description: "Chest pain type (0 typical angina, 1 atypical, 2 non-anginal, 3 asymptomatic)",
    },
    FieldSpec {
        name: "trestbps",
        kind: FieldKind::Numeric { min: 94.0, max: 200.0 },
        description: "Resting blood pressure (mm Hg)",
    },
    FieldSpec {
        name: "chol",
        kind: FieldKind::Numeric { min: 126.0, max: 564.0 },
        description: "Serum cholesterol (mg/dl)",
    },
    FieldSpec {
        name: "fbs",
        kind: FieldKind::Categorical { domain: BINARY },
        description: "Fasting blood sugar > 120 mg/dl (1 = true; 0 = false)",
    },
    FieldSpec {
        name: "restecg",
        kind: FieldKind::Categorical { domain: THREE_LEVEL },
        description: "Resting ECG (0 normal, 1 ST-T abnormality, 2 LV hypertrophy)",
    },
    FieldSpec {
        name: "thalach",
        kind: FieldKind::Numeric { min: 71.0, max: 202.0 },
        description: "Maximum heart rate achieved",
    },
    FieldSpec {
        name: "exang",
        kind: FieldKind::Categorical { domain: BINARY },
        description: "Exercise induced angina (1 = yes; 0 = no)",
    },
    FieldSpec {
        name: "oldpeak",
        kind: FieldKind::Numeric { min: 0.0, max: 6.2 },
        description: "ST depression induced by exercise relative to rest",
    },
    FieldSpec {
        name: "slope",
        kind: FieldKind::Categorical { domain: THREE_LEVEL },
        description: "Slope of the peak exercise ST segment (0 up, 1 flat, 2 down)",
    },
    FieldSpec {
        name: "ca",
        kind: FieldKind::Categorical { domain: FOUR_LEVEL },
        description: "Number of major vessels colored by fluoroscopy",
    },
    FieldSpec {
        name: "thal",
        kind: FieldKind::Categorical { domain: FOUR_LEVEL },
        description: "Thalassemia (0 normal, 1 fixed defect, 2 reversible defect, 3 unknown)",
    },
];

/// Numeric field names, in canonical relative order. Only these columns are
/// standardized by the preprocessor.
pub static NUMERIC_FIELDS: [&str; 5] = ["age", "trestbps", "chol", "thalach", "oldpeak"];

/// Look up a field spec by name.
pub fn field(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.name == name)
}

/// Canonical feature names as owned strings (for artifact metadata).
pub fn feature_names() -> Vec<String> {
    FIELDS.iter().map(|f| f.name.to_string()).collect()
}

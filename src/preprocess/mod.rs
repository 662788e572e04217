//! Feature preprocessing: z-score standardization of numeric columns.
//!
//! Numeric fields are standardized as `(x - mean) / stddev` using parameters
//! fitted exclusively on the training split. Categorical fields pass through
//! unscaled because their integer codes carry meaning the classifier consumes
//! directly.
//!
//! The output vector's column order is the canonical schema order, and the
//! join between schema fields and fitted parameters is by field name. A
//! numeric field with no fitted parameters is an error rather than a silently
//! misaligned column.

use nalgebra::DVector;

use crate::domain::{FeatureRecord, NormalizationParameters};
use crate::error::AppError;
use crate::schema::{self, FieldKind, NUMERIC_FIELDS};

/// A standard deviation this small is treated as zero variance.
const STD_EPS: f64 = 1e-12;

/// Fit normalization parameters over a training split.
///
/// A zero-variance column would make standardization undefined, so its
/// standard deviation is replaced by 1.0; the column then passes through
/// mean-centered only.
pub fn fit(records: &[FeatureRecord]) -> Result<NormalizationParameters, AppError> {
    if records.is_empty() {
        return Err(AppError::precondition(
            "cannot fit normalization parameters on an empty training set",
        ));
    }

    let mut fields = Vec::with_capacity(NUMERIC_FIELDS.len());
    let mut means = Vec::with_capacity(NUMERIC_FIELDS.len());
    let mut stds = Vec::with_capacity(NUMERIC_FIELDS.len());

    for name in NUMERIC_FIELDS {
        let values: Vec<f64> = records
            .iter()
            .map(|r| {
                r.value(name)
                    .unwrap_or_else(|| unreachable!("schema numeric field '{name}' missing accessor"))
            })
            .collect();
        let column = DVector::from_vec(values);
        let mean = column.mean();
        // Population standard deviation, matching how the original scaler
        // was fitted.
        let std = column.variance().sqrt();
        let std = if std <= STD_EPS { 1.0 } else { std };

        fields.push(name.to_string());
        means.push(mean);
        stds.push(std);
    }

    Ok(NormalizationParameters { fields, means, stds })
}

/// Transform a validated record into the canonical 13-column feature vector.
pub fn transform(
    record: &FeatureRecord,
    params: &NormalizationParameters,
) -> Result<Vec<f64>, AppError> {
    let mut out = Vec::with_capacity(schema::FEATURE_COUNT);
    for spec in schema::FIELDS.iter() {
        let raw = record
            .value(spec.name)
            .unwrap_or_else(|| unreachable!("schema field '{}' missing accessor", spec.name));
        let v = match spec.kind {
            FieldKind::Numeric { .. } => {
                let (mean, std) = params.for_field(spec.name).ok_or_else(|| {
                    AppError::artifact(format!(
                        "no normalization parameters for numeric field '{}'",
                        spec.name
                    ))
                })?;
                (raw - mean) / std
            }
            FieldKind::Categorical { .. } => raw,
        };
        out.push(v);
    }
    Ok(out)
}

/// Transform a batch of records into row vectors.
pub fn transform_all(
    records: &[FeatureRecord],
    params: &NormalizationParameters,
) -> Result<Vec<Vec<f64>>, AppError> {
    records.iter().map(|r| transform(r, params)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate;
    use serde_json::json;

    fn record(age: f64, chol: f64) -> FeatureRecord {
        FeatureRecord {
            age,
            sex: 1,
            cp: 1,
            trestbps: 130.0,
            chol,
            fbs: 0,
            restecg: 0,
            thalach: 150.0,
            exang: 0,
            oldpeak: 1.0,
            slope: 1,
            ca: 0,
            thal: 2,
        }
    }

    #[test]
    fn fit_computes_population_statistics() {
        let records = vec![record(40.0, 200.0), record(60.0, 240.0)];
        let params = fit(&records).unwrap();
        let (mean, std) = params.for_field("age").unwrap();
        assert!((mean - 50.0).abs() < 1e-12);
        assert!((std - 10.0).abs() < 1e-12);
    }

    #[test]
    fn zero_variance_column_standardizes_with_unit_std() {
        // trestbps is identical across records.
        let records = vec![record(40.0, 200.0), record(60.0, 240.0)];
        let params = fit(&records).unwrap();
        let (mean, std) = params.for_field("trestbps").unwrap();
        assert_eq!(std, 1.0);

        let v = transform(&records[0], &params).unwrap();
        // trestbps is column index 3 in canonical order.
        assert!((v[3] - (130.0 - mean)).abs() < 1e-12);
    }

    #[test]
    fn transform_standardizes_numeric_and_passes_categorical_through() {
        let records = vec![record(40.0, 200.0), record(60.0, 240.0)];
        let params = fit(&records).unwrap();
        let v = transform(&records[0], &params).unwrap();

        assert_eq!(v.len(), schema::FEATURE_COUNT);
        // age standardized: (40 - 50) / 10.
        assert!((v[0] - (-1.0)).abs() < 1e-12);
        // sex passes through as its raw code.
        assert_eq!(v[1], 1.0);
        // cp passes through.
        assert_eq!(v[2], 1.0);
    }

    #[test]
    fn fit_on_empty_training_set_is_a_precondition_error() {
        assert!(fit(&[]).is_err());
    }

    #[test]
    fn transform_fails_loudly_on_missing_parameters() {
        let records = vec![record(40.0, 200.0)];
        let mut params = fit(&records).unwrap();
        params.fields.retain(|f| f != "chol");
        params.means.pop();
        params.stds.pop();
        assert!(transform(&records[0], &params).is_err());
    }

    #[test]
    fn key_insertion_order_does_not_affect_the_vector() {
        // The same record expressed with two different key orders must produce
        // identical transformed vectors.
        let a = json!({
            "age": 55, "sex": 1, "cp": 1, "trestbps": 140, "chol": 240,
            "fbs": 0, "restecg": 1, "thalach": 145, "exang": 0,
            "oldpeak": 1.5, "slope": 1, "ca": 1, "thal": 2
        });
        let b = json!({
            "thal": 2, "ca": 1, "slope": 1, "oldpeak": 1.5, "exang": 0,
            "thalach": 145, "restecg": 1, "fbs": 0, "chol": 240,
            "trestbps": 140, "cp": 1, "sex": 1, "age": 55
        });
        let (serde_json::Value::Object(a), serde_json::Value::Object(b)) = (a, b) else {
            unreachable!()
        };

        let ra = validate::validate(&a).unwrap();
        let rb = validate::validate(&b).unwrap();
        let params = fit(&[ra.clone()]).unwrap();

        assert_eq!(transform(&ra, &params).unwrap(), transform(&rb, &params).unwrap());
    }
}

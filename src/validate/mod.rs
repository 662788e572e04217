//! Input validation: raw transport mapping -> typed `FeatureRecord`.
//!
//! The whole record is rejected on the first invalid field, in canonical
//! schema order, with a field-qualified message. No partial repair and no
//! silent clamping: an out-of-domain value is an error, never a nearest
//! valid value.
//!
//! Coercion rules:
//! - categorical fields accept integers, float-valued integers (`2.0`) and
//!   numeric strings (`"2"`, `"2.0"`), and must be members of the field's
//!   enumerated domain
//! - numeric fields accept any finite non-negative number or numeric string;
//!   strict mode additionally enforces the schema's documented plausible range

use serde_json::Value;

use crate::domain::{FeatureRecord, RawRecord};
use crate::error::AppError;
use crate::schema::{self, FieldKind};

/// Validate a raw record, enforcing domains but not numeric upper bounds.
pub fn validate(raw: &RawRecord) -> Result<FeatureRecord, AppError> {
    validate_with(raw, false)
}

/// Validate a raw record, additionally enforcing the documented plausible
/// range of every numeric field.
pub fn validate_strict(raw: &RawRecord) -> Result<FeatureRecord, AppError> {
    validate_with(raw, true)
}

fn validate_with(raw: &RawRecord, strict: bool) -> Result<FeatureRecord, AppError> {
    // Fields are checked in canonical schema order so rejection messages are
    // deterministic regardless of the mapping's insertion order.
    Ok(FeatureRecord {
        age: numeric(raw, "age", strict)?,
        sex: categorical(raw, "sex")?,
        cp: categorical(raw, "cp")?,
        trestbps: numeric(raw, "trestbps", strict)?,
        chol: numeric(raw, "chol", strict)?,
        fbs: categorical(raw, "fbs")?,
        restecg: categorical(raw, "restecg")?,
        thalach: numeric(raw, "thalach", strict)?,
        exang: categorical(raw, "exang")?,
        oldpeak: numeric(raw, "oldpeak", strict)?,
        slope: categorical(raw, "slope")?,
        ca: categorical(raw, "ca")?,
        thal: categorical(raw, "thal")?,
    })
}

/// Extract a raw value, rejecting missing keys and nulls.
fn present<'a>(raw: &'a RawRecord, field: &str) -> Result<&'a Value, AppError> {
    match raw.get(field) {
        None => Err(AppError::schema(field, "missing required field")),
        Some(Value::Null) => Err(AppError::schema(field, "must not be null")),
        Some(v) => Ok(v),
    }
}

/// Coerce a JSON value to `f64`, accepting numbers and numeric strings.
fn as_f64(field: &str, value: &Value) -> Result<f64, AppError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| AppError::schema(field, "must be a finite number")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| AppError::schema(field, format!("'{s}' is not a number"))),
        _ => Err(AppError::schema(field, "must be a number")),
    }
}

fn numeric(raw: &RawRecord, field: &str, strict: bool) -> Result<f64, AppError> {
    let value = as_f64(field, present(raw, field)?)?;
    if !value.is_finite() {
        return Err(AppError::schema(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(AppError::schema(field, "must be non-negative"));
    }
    if strict {
        let spec = schema::field(field)
            .unwrap_or_else(|| unreachable!("numeric() is only called with schema field names"));
        if let FieldKind::Numeric { min, max } = spec.kind {
            if value < min || value > max {
                return Err(AppError::schema(
                    field,
                    format!("must be within the plausible range [{min}, {max}], got {value}"),
                ));
            }
        }
    }
    Ok(value)
}

fn categorical(raw: &RawRecord, field: &str) -> Result<u8, AppError> {
    let value = as_f64(field, present(raw, field)?)?;
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(AppError::schema(
            field,
            format!("must be an integer code, got {value}"),
        ));
    }
    if !(0.0..=255.0).contains(&value) {
        return Err(AppError::schema(field, format!("code {value} out of range")));
    }
    let code = value as u8;

    let spec = schema::field(field)
        .unwrap_or_else(|| unreachable!("categorical() is only called with schema field names"));
    let FieldKind::Categorical { domain } = spec.kind else {
        unreachable!("categorical() is only called for categorical fields");
    };
    if !domain.contains(&code) {
        let allowed: Vec<String> = domain.iter().map(|v| v.to_string()).collect();
        return Err(AppError::schema(
            field,
            format!("must be one of {}", allowed.join(", ")),
        ));
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_raw() -> RawRecord {
        let v = json!({
            "age": 55, "sex": 1, "cp": 1, "trestbps": 140, "chol": 240,
            "fbs": 0, "restecg": 1, "thalach": 145, "exang": 0,
            "oldpeak": 1.5, "slope": 1, "ca": 1, "thal": 2
        });
        match v {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn accepts_a_complete_valid_record() {
        let record = validate(&valid_raw()).unwrap();
        assert_eq!(record.age, 55.0);
        assert_eq!(record.cp, 1);
        assert_eq!(record.oldpeak, 1.5);
    }

    #[test]
    fn omitting_any_field_names_that_field() {
        for spec in schema::FIELDS.iter() {
            let mut raw = valid_raw();
            raw.remove(spec.name);
            let err = validate(&raw).unwrap_err();
            assert_eq!(err.field(), Some(spec.name), "expected error for {}", spec.name);
        }
    }

    #[test]
    fn null_field_is_rejected() {
        let mut raw = valid_raw();
        raw.insert("chol".into(), serde_json::Value::Null);
        let err = validate(&raw).unwrap_err();
        assert_eq!(err.field(), Some("chol"));
    }

    #[test]
    fn categorical_domain_is_enforced() {
        let mut raw = valid_raw();
        raw.insert("cp".into(), json!(4));
        assert!(validate(&raw).is_err());

        raw.insert("cp".into(), json!(3));
        assert_eq!(validate(&raw).unwrap().cp, 3);
    }

    #[test]
    fn categorical_coercion_accepts_float_valued_integers() {
        let mut raw = valid_raw();
        raw.insert("cp".into(), json!(2.0));
        assert_eq!(validate(&raw).unwrap().cp, 2);

        raw.insert("cp".into(), json!("2.0"));
        assert_eq!(validate(&raw).unwrap().cp, 2);

        raw.insert("cp".into(), json!(2.5));
        assert!(validate(&raw).is_err());
    }

    #[test]
    fn numeric_coercion_rejects_non_numeric_strings() {
        let mut raw = valid_raw();
        raw.insert("age".into(), json!("sixty"));
        let err = validate(&raw).unwrap_err();
        assert_eq!(err.field(), Some("age"));

        raw.insert("age".into(), json!("60.5"));
        assert_eq!(validate(&raw).unwrap().age, 60.5);
    }

    #[test]
    fn negative_numeric_is_rejected() {
        let mut raw = valid_raw();
        raw.insert("oldpeak".into(), json!(-0.5));
        assert!(validate(&raw).is_err());
    }

    #[test]
    fn strict_mode_enforces_plausible_ranges() {
        let mut raw = valid_raw();
        raw.insert("chol".into(), json!(600));
        // Lenient mode only requires non-negative.
        assert!(validate(&raw).is_ok());
        let err = validate_strict(&raw).unwrap_err();
        assert_eq!(err.field(), Some("chol"));
    }

    #[test]
    fn rejection_happens_before_any_scoring_state_is_built() {
        // Two invalid fields: the error must name the first one in canonical order.
        let mut raw = valid_raw();
        raw.insert("sex".into(), json!(3));
        raw.insert("thal".into(), json!(9));
        let err = validate(&raw).unwrap_err();
        assert_eq!(err.field(), Some("sex"));
    }
}

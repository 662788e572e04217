//! File-backed labeled dataset ingest.
//!
//! Expects a header row naming the 13 schema fields plus `target`, in any
//! column order. Each data row is coerced through the same validator used at
//! serving time; rows that fail coercion or domain checks are dropped (and
//! counted) rather than aborting the whole ingest, mirroring how the original
//! dataset preparation dropped incomplete rows. The `target` column is
//! binarized: any value > 0 means risk=1.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::domain::{LabeledRecord, RawRecord};
use crate::error::AppError;
use crate::schema;
use crate::validate;

/// Load a labeled dataset from a CSV file.
pub fn load_csv(path: &Path) -> Result<Vec<LabeledRecord>, AppError> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("failed to read dataset '{}': {e}", path.display())))?;

    let mut lines = content.lines().filter(|l| !l.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| AppError::io(format!("dataset '{}' is empty", path.display())))?;
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();

    // Resolve the column index of each required field up front.
    let mut field_cols = Vec::with_capacity(schema::FEATURE_COUNT);
    for spec in schema::FIELDS.iter() {
        let idx = columns
            .iter()
            .position(|&c| c == spec.name)
            .ok_or_else(|| AppError::io(format!("dataset is missing column '{}'", spec.name)))?;
        field_cols.push((spec.name, idx));
    }
    let target_col = columns
        .iter()
        .position(|&c| c == "target")
        .ok_or_else(|| AppError::io("dataset is missing column 'target'"))?;

    let mut out = Vec::new();
    let mut dropped = 0usize;
    for line in lines {
        let cells: Vec<&str> = line.split(',').map(str::trim).collect();
        match parse_row(&cells, &field_cols, target_col) {
            Ok(labeled) => out.push(labeled),
            Err(err) => {
                dropped += 1;
                log::warn!("dropping malformed dataset row: {err}");
            }
        }
    }

    if dropped > 0 {
        log::info!("dropped {dropped} malformed rows from '{}'", path.display());
    }
    if out.is_empty() {
        return Err(AppError::precondition(format!(
            "dataset '{}' contains no usable rows",
            path.display()
        )));
    }
    Ok(out)
}

fn parse_row(
    cells: &[&str],
    field_cols: &[(&'static str, usize)],
    target_col: usize,
) -> Result<LabeledRecord, AppError> {
    let mut raw = RawRecord::new();
    for &(name, idx) in field_cols {
        let cell = cells
            .get(idx)
            .ok_or_else(|| AppError::schema(name, "row has too few columns"))?;
        let value = cell
            .parse::<f64>()
            .map_err(|_| AppError::schema(name, format!("'{cell}' is not a number")))?;
        let number = serde_json::Number::from_f64(value)
            .ok_or_else(|| AppError::schema(name, "non-finite value"))?;
        raw.insert(name.to_string(), Value::Number(number));
    }

    let record = validate::validate(&raw)?;

    let target_cell = cells
        .get(target_col)
        .ok_or_else(|| AppError::schema("target", "row has too few columns"))?;
    let target = target_cell
        .parse::<f64>()
        .map_err(|_| AppError::schema("target", format!("'{target_cell}' is not a number")))?;
    // Multi-level disease severity collapses to a binary label.
    let label = u8::from(target > 0.0);

    Ok(LabeledRecord { record, label })
}

//! Read/write the persisted model artifact.
//!
//! The artifact is a directory holding a versioned pair:
//!
//! - `model.json` — the fitted forest plus its hyperparameters and the
//!   feature ordering it was trained on
//! - `scaler.json` — the normalization parameters fitted on the same
//!   training split
//!
//! plus `metrics.json`, the evaluation report from the training run. The two
//! halves of the pair are only usable together: loading fails loudly when
//! either file is missing, their format versions disagree, or the stored
//! feature ordering does not match the current schema.

use std::fs::{self, File};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{EvaluationReport, NormalizationParameters};
use crate::error::AppError;
use crate::forest::RandomForest;
use crate::schema;

/// Bump when the on-disk layout of either half changes.
const ARTIFACT_VERSION: u32 = 1;

const MODEL_FILE: &str = "model.json";
const SCALER_FILE: &str = "scaler.json";
const METRICS_FILE: &str = "metrics.json";

#[derive(Debug, Serialize, Deserialize)]
struct ModelFile {
    version: u32,
    created_at: DateTime<Utc>,
    classifier: RandomForest,
}

#[derive(Debug, Serialize, Deserialize)]
struct ScalerFile {
    version: u32,
    created_at: DateTime<Utc>,
    params: NormalizationParameters,
}

/// Persist the trained pair and its evaluation report.
pub fn save(
    dir: &Path,
    classifier: &RandomForest,
    params: &NormalizationParameters,
    report: &EvaluationReport,
) -> Result<(), AppError> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::io(format!("failed to create '{}': {e}", dir.display())))?;

    let created_at = Utc::now();
    write_json(
        &dir.join(MODEL_FILE),
        &ModelFile {
            version: ARTIFACT_VERSION,
            created_at,
            classifier: classifier.clone(),
        },
    )?;
    write_json(
        &dir.join(SCALER_FILE),
        &ScalerFile {
            version: ARTIFACT_VERSION,
            created_at,
            params: params.clone(),
        },
    )?;
    write_json(&dir.join(METRICS_FILE), report)?;
    Ok(())
}

/// Load the trained pair, verifying both halves exist and agree.
pub fn load(dir: &Path) -> Result<(RandomForest, NormalizationParameters), AppError> {
    let model_path = dir.join(MODEL_FILE);
    let scaler_path = dir.join(SCALER_FILE);

    // Report the missing half by name before attempting any parse, so a
    // half-written artifact is never half-loaded.
    if !model_path.exists() {
        return Err(AppError::artifact(format!(
            "classifier half '{}' is missing",
            model_path.display()
        )));
    }
    if !scaler_path.exists() {
        return Err(AppError::artifact(format!(
            "normalization half '{}' is missing",
            scaler_path.display()
        )));
    }

    let model: ModelFile = read_json(&model_path)?;
    let scaler: ScalerFile = read_json(&scaler_path)?;

    if model.version != ARTIFACT_VERSION || scaler.version != ARTIFACT_VERSION {
        return Err(AppError::artifact(format!(
            "artifact version mismatch: model v{}, scaler v{}, supported v{ARTIFACT_VERSION}",
            model.version, scaler.version
        )));
    }
    if model.classifier.feature_names != schema::feature_names() {
        return Err(AppError::artifact(
            "stored feature ordering does not match the current schema",
        ));
    }
    scaler.params.check_schema()?;

    Ok((model.classifier, scaler.params))
}

/// Load the evaluation report written alongside the pair, if present.
pub fn load_report(dir: &Path) -> Result<Option<EvaluationReport>, AppError> {
    let path = dir.join(METRICS_FILE);
    if !path.exists() {
        return Ok(None);
    }
    Ok(Some(read_json(&path)?))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("failed to create '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, value)
        .map_err(|e| AppError::io(format!("failed to write '{}': {e}", path.display())))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("failed to open '{}': {e}", path.display())))?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::artifact(format!("invalid artifact '{}': {e}", path.display())))
}

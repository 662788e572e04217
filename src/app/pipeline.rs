//! Shared training pipeline used by the CLI front-end.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! dataset ingest -> train/test split -> normalization fit -> grid search ->
//! held-out evaluation
//!
//! The CLI then focuses on presentation and artifact persistence.

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::data;
use crate::domain::{
    EvaluationReport, FeatureImportance, LabeledRecord, NormalizationParameters, TrainConfig,
};
use crate::error::AppError;
use crate::eval;
use crate::preprocess;
use crate::schema;
use crate::train::{self, TrainOutcome};

/// All computed outputs of a single training run.
#[derive(Debug, Clone)]
pub struct TrainOutput {
    pub outcome: TrainOutcome,
    pub params: NormalizationParameters,
    pub report: EvaluationReport,
    pub importance: Vec<FeatureImportance>,
    pub n_train: usize,
    pub n_test: usize,
}

/// Execute the full training pipeline and return the computed outputs.
pub fn run_train(config: &TrainConfig) -> Result<TrainOutput, AppError> {
    // 1) Ingest the labeled dataset.
    let dataset = match &config.data_path {
        Some(path) => {
            log::info!("loading dataset from '{}'", path.display());
            data::load_csv(path)?
        }
        None => {
            log::info!(
                "generating {} synthetic records (seed {})",
                config.sample_count,
                config.seed
            );
            data::generate(config.sample_count, config.seed)?
        }
    };

    // 2) Seeded train/test split.
    let (train_set, test_set) = split(&dataset, config.test_fraction, config.seed)?;
    log::info!("split: {} train / {} test", train_set.len(), test_set.len());

    // 3) Fit normalization on the training split only, then transform both.
    let train_records: Vec<_> = train_set.iter().map(|l| l.record.clone()).collect();
    let test_records: Vec<_> = test_set.iter().map(|l| l.record.clone()).collect();
    let params = preprocess::fit(&train_records)?;
    let x_train = preprocess::transform_all(&train_records, &params)?;
    let x_test = preprocess::transform_all(&test_records, &params)?;
    let y_train: Vec<u8> = train_set.iter().map(|l| l.label).collect();
    let y_test: Vec<u8> = test_set.iter().map(|l| l.label).collect();

    // 4) Grid search with cross-validated selection, then refit the winner.
    let grid = train::hyperparameter_grid(config)?;
    log::info!("searching {} hyperparameter candidates", grid.len());
    let outcome = train::train(
        &x_train,
        &y_train,
        &schema::feature_names(),
        &grid,
        config.folds,
        config.seed,
    )?;

    // 5) Held-out evaluation and importance ranking of the refit winner.
    let report = eval::evaluate(&outcome.classifier, &x_test, &y_test)?;
    let importance = eval::feature_importance(&outcome.classifier);

    Ok(TrainOutput {
        n_train: train_set.len(),
        n_test: test_set.len(),
        outcome,
        params,
        report,
        importance,
    })
}

/// Shuffle once with the run seed and carve off the trailing test fraction.
fn split(
    dataset: &[LabeledRecord],
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<LabeledRecord>, Vec<LabeledRecord>), AppError> {
    if !(0.0..1.0).contains(&test_fraction) {
        return Err(AppError::precondition(format!(
            "test fraction {test_fraction} must be in [0, 1)"
        )));
    }
    let n_test = (dataset.len() as f64 * test_fraction).round() as usize;
    if n_test == 0 || n_test >= dataset.len() {
        return Err(AppError::precondition(format!(
            "cannot split {} records into a usable train/test pair",
            dataset.len()
        )));
    }

    let mut shuffled = dataset.to_vec();
    let mut rng = StdRng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);

    let test = shuffled.split_off(shuffled.len() - n_test);
    Ok((shuffled, test))
}

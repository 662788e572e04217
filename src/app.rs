//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the training pipeline and persists artifacts
//! - scores single records against a saved model or the rule-based fallback
//! - prints reports

use std::fs;

use clap::Parser;

use crate::cli::{Command, PredictArgs, TrainArgs};
use crate::domain::{FeatureRecord, RawRecord, TrainConfig};
use crate::error::AppError;
use crate::io::artifact;
use crate::scorer::{LearnedScorer, Scorer};
use crate::service::PredictionService;
use crate::validate;

pub mod pipeline;

/// Entry point for the `cardiorisk` binary.
pub fn run() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = crate::cli::Cli::parse();
    match cli.command {
        Command::Train(args) => handle_train(args),
        Command::Predict(args) => handle_predict(args),
        Command::Schema => {
            println!("{}", crate::report::format_schema_table());
            Ok(())
        }
    }
}

fn handle_train(args: TrainArgs) -> Result<(), AppError> {
    let config = train_config_from_args(&args);
    let run = pipeline::run_train(&config)?;

    artifact::save(
        &config.out_dir,
        &run.outcome.classifier,
        &run.params,
        &run.report,
    )?;
    log::info!("artifact written to '{}'", config.out_dir.display());

    println!(
        "{}",
        crate::report::format_train_summary(
            &run.outcome.best,
            run.outcome.best_cv_auc,
            &run.report,
            run.n_train,
            run.n_test,
        )
    );
    println!("{}", crate::report::format_importance(&run.importance));

    check_extreme_cases(&run.outcome.classifier, run.params.clone())?;
    Ok(())
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let raw = read_record(&args.input)?;
    if args.strict {
        validate::validate_strict(&raw)?;
    }

    let service = if args.rule {
        PredictionService::with_rule_based()
    } else {
        PredictionService::from_artifact(&args.model)?
    };

    let result = service.predict(&raw)?;
    println!("{}", crate::report::format_risk_result(&result));
    Ok(())
}

fn read_record(path: &std::path::Path) -> Result<RawRecord, AppError> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("failed to read '{}': {e}", path.display())))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| AppError::io(format!("invalid JSON in '{}': {e}", path.display())))?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(AppError::io(format!(
            "'{}' must contain a JSON object",
            path.display()
        ))),
    }
}

pub fn train_config_from_args(args: &TrainArgs) -> TrainConfig {
    TrainConfig {
        data_path: args.data.clone(),
        out_dir: args.out.clone(),
        sample_count: args.sample_count,
        seed: args.seed,
        test_fraction: args.test_fraction,
        folds: args.folds,
        n_estimators: args.n_estimators.clone(),
        max_depths: args
            .max_depths
            .iter()
            .map(|&d| if d == 0 { None } else { Some(d) })
            .collect(),
        min_samples_splits: args.min_samples_splits.clone(),
        min_samples_leafs: args.min_samples_leafs.clone(),
    }
}

/// Sanity-check the freshly trained model on two clinically obvious profiles.
///
/// A miss is logged, not fatal: small or noisy datasets can legitimately
/// produce a model that gets one of these wrong.
fn check_extreme_cases(
    classifier: &crate::forest::RandomForest,
    params: crate::domain::NormalizationParameters,
) -> Result<(), AppError> {
    let scorer = LearnedScorer::new(classifier.clone(), params)?;

    let low = FeatureRecord {
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
    };
    let high = FeatureRecord {
        age: 75.0,
        sex: 1,
        cp: 3,
        trestbps: 180.0,
        chol: 350.0,
        fbs: 1,
        restecg: 2,
        thalach: 90.0,
        exang: 1,
        oldpeak: 4.0,
        slope: 0,
        ca: 3,
        thal: 1,
    };

    for (name, record, expected) in [("low-risk", &low, 0u8), ("high-risk", &high, 1u8)] {
        let result = scorer.score(record)?;
        if result.prediction == expected {
            log::info!(
                "extreme {name} profile scored as expected (p={:.3})",
                result.probability
            );
        } else {
            log::warn!(
                "extreme {name} profile predicted {} (p={:.3}), expected {expected}",
                result.prediction,
                result.probability
            );
        }
    }
    Ok(())
}

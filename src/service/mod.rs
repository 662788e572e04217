//! Prediction service: the single façade a transport layer calls.
//!
//! Per request: validate the raw mapping, then hand the validated record to
//! the configured scorer. Validation failure short-circuits with a schema
//! error; every other stage is side-effect-free pure computation, so
//! concurrent requests need no coordination.
//!
//! The scorer is held behind an atomically replaceable reference: swapping in
//! a retrained model is a whole-reference replacement visible only to
//! requests that start after the swap, never a partial update observed
//! mid-request.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::domain::{RawRecord, RiskResult};
use crate::error::AppError;
use crate::io::artifact;
use crate::scorer::{LearnedScorer, RuleBasedScorer, Scorer};
use crate::validate;

pub struct PredictionService {
    scorer: RwLock<Arc<dyn Scorer>>,
}

impl std::fmt::Debug for PredictionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionService").finish_non_exhaustive()
    }
}

impl PredictionService {
    pub fn new(scorer: Arc<dyn Scorer>) -> Self {
        PredictionService {
            scorer: RwLock::new(scorer),
        }
    }

    /// Service backed by the deterministic threshold heuristic.
    pub fn with_rule_based() -> Self {
        Self::new(Arc::new(RuleBasedScorer::new()))
    }

    /// Service backed by a persisted classifier/normalization pair.
    ///
    /// Fails before serving anything when the artifact is missing or
    /// inconsistent; the service never starts with a half-loaded pair.
    pub fn from_artifact(dir: &Path) -> Result<Self, AppError> {
        let (forest, params) = artifact::load(dir)?;
        let scorer = LearnedScorer::new(forest, params)?;
        Ok(Self::new(Arc::new(scorer)))
    }

    /// Score one raw record.
    pub fn predict(&self, raw: &RawRecord) -> Result<RiskResult, AppError> {
        let record = validate::validate(raw)?;
        // Clone the reference out of the lock so scoring runs unlocked and a
        // concurrent swap cannot be observed mid-request.
        let scorer = Arc::clone(&*self.scorer.read());
        scorer.score(&record)
    }

    /// Atomically replace the scorer (hot-reload after retraining).
    pub fn replace_scorer(&self, scorer: Arc<dyn Scorer>) {
        *self.scorer.write() = scorer;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeatureRecord, RiskResult};
    use serde_json::json;

    fn raw(age: i64) -> RawRecord {
        let v = json!({
            "age": age, "sex": 0, "cp": 0, "trestbps": 105, "chol": 150,
            "fbs": 0, "restecg": 0, "thalach": 185, "exang": 0,
            "oldpeak": 0.0, "slope": 2, "ca": 0, "thal": 2
        });
        match v {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn predicts_through_the_rule_based_scorer() {
        let service = PredictionService::with_rule_based();
        let result = service.predict(&raw(25)).unwrap();
        assert_eq!(result.prediction, 0);
        assert_eq!(result.probability, 0.0);
    }

    #[test]
    fn validation_failure_short_circuits() {
        let service = PredictionService::with_rule_based();
        let mut bad = raw(25);
        bad.insert("cp".into(), json!(7));
        let err = service.predict(&bad).unwrap_err();
        assert_eq!(err.field(), Some("cp"));
    }

    #[test]
    fn missing_artifact_refuses_to_construct() {
        let dir = tempfile::tempdir().unwrap();
        let err = PredictionService::from_artifact(dir.path()).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn scorer_swap_is_visible_to_subsequent_requests() {
        struct Constant(f64);
        impl Scorer for Constant {
            fn score(&self, _: &FeatureRecord) -> Result<RiskResult, AppError> {
                Ok(RiskResult {
                    prediction: u8::from(self.0 > 0.5),
                    probability: self.0,
                    message: String::new(),
                    risk_score: None,
                })
            }
        }

        let service = PredictionService::new(Arc::new(Constant(0.1)));
        assert_eq!(service.predict(&raw(25)).unwrap().probability, 0.1);

        service.replace_scorer(Arc::new(Constant(0.9)));
        assert_eq!(service.predict(&raw(25)).unwrap().probability, 0.9);
    }
}

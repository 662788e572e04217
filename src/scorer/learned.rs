//! Learned scorer: the trained forest plus its normalization parameters.
//!
//! The two halves are only usable as a pair; construction verifies the pair
//! is consistent with the current schema so a stale or mismatched artifact
//! can never silently corrupt predictions.

use crate::domain::{FeatureRecord, NormalizationParameters, RiskResult};
use crate::error::AppError;
use crate::forest::RandomForest;
use crate::preprocess;
use crate::schema;
use crate::scorer::{message_for, Scorer};

pub struct LearnedScorer {
    forest: RandomForest,
    params: NormalizationParameters,
}

impl LearnedScorer {
    /// Pair a forest with its fitted normalization parameters.
    pub fn new(forest: RandomForest, params: NormalizationParameters) -> Result<Self, AppError> {
        params.check_schema()?;
        if forest.feature_names != schema::feature_names() {
            return Err(AppError::artifact(format!(
                "classifier was trained on feature ordering {:?}, expected {:?}",
                forest.feature_names,
                schema::feature_names()
            )));
        }
        Ok(LearnedScorer { forest, params })
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    pub fn params(&self) -> &NormalizationParameters {
        &self.params
    }
}

impl Scorer for LearnedScorer {
    fn score(&self, record: &FeatureRecord) -> Result<RiskResult, AppError> {
        let vector = preprocess::transform(record, &self.params)?;
        let probability = self.forest.predict_proba(&vector);
        let prediction = u8::from(probability > 0.5);
        Ok(RiskResult {
            prediction,
            probability,
            message: message_for(prediction),
            risk_score: None,
        })
    }
}

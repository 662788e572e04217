//! Deterministic threshold-driven risk heuristic.
//!
//! Ten risk factors are counted: five numeric thresholds and five categorical
//! indicators. The probability is the satisfied count over the fixed
//! denominator of 10, so every input maps to one of 11 discrete probability
//! levels. No trained artifact is involved.

use crate::domain::{FeatureRecord, RiskResult};
use crate::error::AppError;
use crate::scorer::{message_for, Scorer};

/// Total number of heuristic risk factors (the probability denominator).
pub const MAX_RISK_SCORE: u32 = 10;

/// Threshold heuristic over the validated record.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedScorer;

impl RuleBasedScorer {
    pub fn new() -> Self {
        RuleBasedScorer
    }

    /// Count the satisfied risk factors.
    pub fn risk_score(record: &FeatureRecord) -> u32 {
        let numeric = [
            record.age > 50.0,
            record.trestbps > 130.0,
            record.chol > 200.0,
            record.thalach < 150.0,
            record.oldpeak > 1.0,
        ];
        let categorical = [
            record.sex == 1,
            record.cp > 0,
            record.fbs == 1,
            record.exang == 1,
            record.ca > 0,
        ];
        numeric
            .into_iter()
            .chain(categorical)
            .map(u32::from)
            .sum()
    }
}

impl Scorer for RuleBasedScorer {
    fn score(&self, record: &FeatureRecord) -> Result<RiskResult, AppError> {
        let risk_score = Self::risk_score(record);
        let probability = f64::from(risk_score) / f64::from(MAX_RISK_SCORE);
        let prediction = u8::from(probability > 0.5);
        Ok(RiskResult {
            prediction,
            probability,
            message: message_for(prediction),
            risk_score: Some(risk_score),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::{HIGH_RISK_MESSAGE, LOW_RISK_MESSAGE};

    fn zero_factor_record() -> FeatureRecord {
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

    fn all_factor_record() -> FeatureRecord {
        FeatureRecord {
            age: 75.0,
            sex: 1,
            cp: 3,
            trestbps: 190.0,
            chol: 380.0,
            fbs: 1,
            restecg: 2,
            thalach: 95.0,
            exang: 1,
            oldpeak: 5.0,
            slope: 0,
            ca: 3,
            thal: 1,
        }
    }

    #[test]
    fn zero_factors_yield_zero_probability() {
        let result = RuleBasedScorer::new().score(&zero_factor_record()).unwrap();
        assert_eq!(result.prediction, 0);
        assert_eq!(result.probability, 0.0);
        assert_eq!(result.risk_score, Some(0));
        assert_eq!(result.message, LOW_RISK_MESSAGE);
    }

    #[test]
    fn all_factors_yield_full_probability() {
        let result = RuleBasedScorer::new().score(&all_factor_record()).unwrap();
        assert_eq!(result.prediction, 1);
        assert_eq!(result.probability, 1.0);
        assert_eq!(result.risk_score, Some(MAX_RISK_SCORE));
        assert_eq!(result.message, HIGH_RISK_MESSAGE);
    }

    #[test]
    fn probability_at_exactly_half_is_low_risk() {
        // 5 of 10 factors: probability 0.5 must not be classified positive.
        let mut record = zero_factor_record();
        record.age = 60.0;
        record.trestbps = 140.0;
        record.chol = 250.0;
        record.thalach = 120.0;
        record.oldpeak = 2.0;
        let result = RuleBasedScorer::new().score(&record).unwrap();
        assert_eq!(result.risk_score, Some(5));
        assert_eq!(result.probability, 0.5);
        assert_eq!(result.prediction, 0);
    }

    #[test]
    fn oldpeak_increase_never_lowers_the_score() {
        let mut record = zero_factor_record();
        let mut previous = 0;
        for step in 0..20 {
            record.oldpeak = step as f64 * 0.35;
            let score = RuleBasedScorer::risk_score(&record);
            assert!(score >= previous, "score dropped at oldpeak {}", record.oldpeak);
            previous = score;
        }
    }

    #[test]
    fn threshold_boundaries_are_exclusive() {
        // Values exactly at a threshold do not count as risk factors.
        let mut record = zero_factor_record();
        record.age = 50.0;
        record.trestbps = 130.0;
        record.chol = 200.0;
        record.thalach = 150.0;
        record.oldpeak = 1.0;
        assert_eq!(RuleBasedScorer::risk_score(&record), 0);
    }
}

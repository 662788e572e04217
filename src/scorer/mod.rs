//! Risk scorers: the closed set of strategies behind one capability.
//!
//! Two variants exist for the same decision:
//!
//! - `RuleBasedScorer`: a deterministic threshold heuristic needing no
//!   trained artifact
//! - `LearnedScorer`: the trained forest plus its paired normalization
//!   parameters
//!
//! The prediction service selects one at construction time; request handling
//! never branches on the variant.

use crate::domain::{FeatureRecord, RiskResult};
use crate::error::AppError;

pub mod learned;
pub mod rule;

pub use learned::LearnedScorer;
pub use rule::RuleBasedScorer;

/// Message attached to a positive prediction.
pub const HIGH_RISK_MESSAGE: &str = "High risk of heart disease";
/// Message attached to a negative prediction.
pub const LOW_RISK_MESSAGE: &str = "Low risk of heart disease";

/// A strategy turning a validated record into a risk decision.
pub trait Scorer: Send + Sync {
    fn score(&self, record: &FeatureRecord) -> Result<RiskResult, AppError>;
}

/// The fixed message for a prediction value.
pub fn message_for(prediction: u8) -> String {
    if prediction == 1 {
        HIGH_RISK_MESSAGE.to_string()
    } else {
        LOW_RISK_MESSAGE.to_string()
    }
}

//! Synthetic labeled dataset generation.
//!
//! Features are drawn from clinically plausible distributions (normal and
//! exponential draws clipped to the ranges the schema documents); the binary
//! label is assigned by a priority-ordered rule cascade:
//!
//! 1. critical-risk conditions force risk=1 unconditionally
//! 2. severe-risk conditions force risk=1
//! 3. a very-low-risk combination forces risk=0 (overriding everything
//!    except critical risk)
//! 4. a protective-factor combination suppresses moderate risk
//! 5. moderate-risk conditions force risk=1
//!
//! The cascade order is part of the contract: later rules can downgrade a
//! lower-priority assignment but never override critical risk.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{Exp, Normal};

use crate::domain::{FeatureRecord, LabeledRecord};
use crate::error::AppError;

/// Generate `count` labeled records from the given seed.
pub fn generate(count: usize, seed: u64) -> Result<Vec<LabeledRecord>, AppError> {
    if count == 0 {
        return Err(AppError::precondition("sample count must be > 0"));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let age_dist = normal(55.0, 12.0)?;
    let trestbps_dist = normal(130.0, 15.0)?;
    let chol_dist = normal(220.0, 40.0)?;
    let glucose_dist = normal(100.0, 20.0)?;
    let thalach_dist = normal(150.0, 20.0)?;
    let oldpeak_dist = Exp::<f64>::new(1.0)
        .map_err(|e| AppError::precondition(format!("oldpeak distribution: {e}")))?;

    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let record = FeatureRecord {
            age: clip_int(age_dist.sample(&mut rng), 25.0, 80.0),
            sex: u8::from(rng.gen_bool(0.5)),
            cp: rng.gen_range(0..4),
            trestbps: clip_int(trestbps_dist.sample(&mut rng), 90.0, 200.0),
            chol: clip_int(chol_dist.sample(&mut rng), 120.0, 400.0),
            fbs: u8::from(glucose_dist.sample(&mut rng) > 120.0),
            restecg: rng.gen_range(0..3),
            thalach: clip_int(thalach_dist.sample(&mut rng), 70.0, 200.0),
            exang: u8::from(rng.gen_bool(0.3)),
            oldpeak: oldpeak_dist.sample(&mut rng).clamp(0.0, 6.2),
            slope: rng.gen_range(0..3),
            ca: rng.gen_range(0..4),
            thal: rng.gen_range(0..3),
        };
        let label = label_for(&record);
        out.push(LabeledRecord { record, label });
    }
    Ok(out)
}

/// Assign the binary risk label by the priority-ordered cascade.
pub fn label_for(r: &FeatureRecord) -> u8 {
    if critical_risk(r) {
        return 1;
    }
    if severe_risk(r) {
        return 1;
    }
    if very_low_risk(r) {
        return 0;
    }
    if protective_factors(r) {
        return 0;
    }
    u8::from(moderate_risk(r))
}

/// Immediate high risk, not overridable by anything below.
fn critical_risk(r: &FeatureRecord) -> bool {
    r.ca >= 3 || r.oldpeak > 4.5 || (r.cp == 3 && r.exang == 1 && r.ca >= 2)
}

fn severe_risk(r: &FeatureRecord) -> bool {
    (r.age > 65.0 && r.chol > 320.0)
        || (r.thalach < 100.0 && r.age > 60.0)
        || (r.trestbps > 180.0 && r.chol > 300.0)
        || (r.cp == 3 && r.oldpeak > 3.0)
}

fn moderate_risk(r: &FeatureRecord) -> bool {
    (r.age > 60.0 && r.chol > 280.0)
        || (r.cp >= 2 && r.exang == 1)
        || r.oldpeak > 2.0
        || r.ca == 2
        || (r.thalach < 120.0 && r.age > 50.0)
        || (r.trestbps > 160.0 && r.chol > 260.0)
}

fn protective_factors(r: &FeatureRecord) -> bool {
    r.age < 40.0
        && r.chol < 200.0
        && r.trestbps < 120.0
        && r.thalach > 150.0
        && r.ca == 0
        && r.oldpeak < 0.5
        && r.cp == 0
        && r.exang == 0
}

fn very_low_risk(r: &FeatureRecord) -> bool {
    r.age < 35.0
        && r.chol < 180.0
        && r.trestbps < 110.0
        && r.thalach > 170.0
        && r.ca == 0
        && r.oldpeak == 0.0
        && r.cp == 0
        && r.exang == 0
        && r.fbs == 0
        && r.restecg == 0
}

fn normal(mean: f64, std: f64) -> Result<Normal<f64>, AppError> {
    Normal::new(mean, std)
        .map_err(|e| AppError::precondition(format!("feature distribution: {e}")))
}

/// Clip to `[lo, hi]` and truncate to a whole number, mirroring how the
/// original dataset stored these measurements.
fn clip_int(v: f64, lo: f64, hi: f64) -> f64 {
    v.clamp(lo, hi).trunc()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline() -> FeatureRecord {
        FeatureRecord {
            age: 50.0,
            sex: 1,
            cp: 1,
            trestbps: 130.0,
            chol: 220.0,
            fbs: 0,
            restecg: 1,
            thalach: 150.0,
            exang: 0,
            oldpeak: 1.0,
            slope: 1,
            ca: 1,
            thal: 2,
        }
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let a = generate(50, 42).unwrap();
        let b = generate(50, 42).unwrap();
        assert_eq!(a, b);
        let c = generate(50, 43).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn generated_features_respect_their_clips_and_domains() {
        for labeled in generate(200, 7).unwrap() {
            let r = &labeled.record;
            assert!((25.0..=80.0).contains(&r.age));
            assert!((90.0..=200.0).contains(&r.trestbps));
            assert!((120.0..=400.0).contains(&r.chol));
            assert!((70.0..=200.0).contains(&r.thalach));
            assert!((0.0..=6.2).contains(&r.oldpeak));
            assert!(r.cp <= 3 && r.restecg <= 2 && r.slope <= 2 && r.ca <= 3 && r.thal <= 2);
        }
    }

    #[test]
    fn generated_labels_contain_both_classes() {
        let labeled = generate(500, 42).unwrap();
        let pos = labeled.iter().filter(|l| l.label == 1).count();
        assert!(pos > 0 && pos < labeled.len());
    }

    #[test]
    fn critical_risk_overrides_protective_factors() {
        let mut r = baseline();
        // Protective profile apart from the vessel count.
        r.age = 35.0;
        r.chol = 190.0;
        r.trestbps = 115.0;
        r.thalach = 160.0;
        r.oldpeak = 0.3;
        r.cp = 0;
        r.exang = 0;
        r.ca = 3;
        assert_eq!(label_for(&r), 1);
    }

    #[test]
    fn very_low_risk_profile_is_labeled_zero() {
        let mut r = baseline();
        r.age = 30.0;
        r.chol = 170.0;
        r.trestbps = 105.0;
        r.thalach = 180.0;
        r.oldpeak = 0.0;
        r.cp = 0;
        r.exang = 0;
        r.fbs = 0;
        r.restecg = 0;
        r.ca = 0;
        assert!(very_low_risk(&r));
        assert_eq!(label_for(&r), 0);

        // Losing one very-low criterion keeps the label at 0 as long as no
        // risk rule fires.
        r.fbs = 1;
        assert!(!very_low_risk(&r));
        assert_eq!(label_for(&r), 0);
    }

    #[test]
    fn severe_risk_is_not_downgraded_by_protective_factors() {
        let mut r = baseline();
        r.age = 67.0;
        r.chol = 330.0;
        assert_eq!(label_for(&r), 1);
    }

    #[test]
    fn cascade_precedence_on_plain_moderate_risk() {
        let mut r = baseline();
        r.oldpeak = 2.5;
        r.ca = 0;
        assert_eq!(label_for(&r), 1);
    }

    #[test]
    fn unremarkable_profile_is_low_risk() {
        assert_eq!(label_for(&baseline()), 0);
    }
}

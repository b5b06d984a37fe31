//! Inference engine: scale, classify, calibrate.
//!
//! [`predict`] is a pure function of the bundle and the validated vector. It
//! holds no state and may run concurrently from any number of handlers.

use super::validation::FeatureVector;
use crate::model::{Diagnosis, ModelBundle};
use serde::Serialize;
use thiserror::Error;

/// Unexpected failure while evaluating a validated vector.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InferenceFault {
    #[error("feature vector has {actual} values but the model expects {expected}")]
    WidthMismatch { expected: usize, actual: usize },

    #[error("decision function produced a non-finite value")]
    NonFiniteDecision,

    #[error("probability estimate is not finite")]
    NonFiniteProbability,
}

impl InferenceFault {
    pub fn kind(&self) -> &'static str {
        match self {
            InferenceFault::WidthMismatch { .. } => "width_mismatch",
            InferenceFault::NonFiniteDecision => "non_finite_decision",
            InferenceFault::NonFiniteProbability => "non_finite_probability",
        }
    }
}

/// Outcome of one prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    pub diagnosis: Diagnosis,
    /// Probability of the benign class, rounded to four decimals.
    pub probability_benign: f64,
    /// Raw decision value; zero or positive selects `classes[1]`.
    pub decision: f64,
}

impl PredictionResult {
    /// Numeric class code exposed on the wire.
    pub fn prediction(&self) -> u8 {
        self.diagnosis.code()
    }
}

/// Round to four decimals, half away from zero.
pub fn round_probability(p: f64) -> f64 {
    (p * 10_000.0).round() / 10_000.0
}

pub fn predict(bundle: &ModelBundle, features: &FeatureVector) -> Result<PredictionResult, InferenceFault> {
    if features.len() != bundle.n_features() {
        return Err(InferenceFault::WidthMismatch {
            expected: bundle.n_features(),
            actual: features.len(),
        });
    }

    let scaled = bundle.scaler().transform(features.as_slice());
    let classifier = bundle.classifier();

    let decision = classifier.decision_function(&scaled);
    if !decision.is_finite() {
        return Err(InferenceFault::NonFiniteDecision);
    }

    let probabilities = classifier.probabilities(decision);
    let benign_idx = if classifier.diagnosis_at(1) == Diagnosis::Benign { 1 } else { 0 };
    let probability_benign = probabilities[benign_idx];
    if !probability_benign.is_finite() {
        return Err(InferenceFault::NonFiniteProbability);
    }

    Ok(PredictionResult {
        diagnosis: classifier.diagnosis_at(classifier.predict_index(decision)),
        probability_benign: round_probability(probability_benign),
        decision,
    })
}

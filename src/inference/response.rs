use super::engine::PredictionResult;
use crate::model::Diagnosis;
use serde::{Deserialize, Serialize};

/// Body returned by `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: u8,
    pub diagnosis: Diagnosis,
    pub probability_benign: f64,
}

impl From<PredictionResult> for PredictResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            prediction: result.prediction(),
            diagnosis: result.diagnosis,
            probability_benign: result.probability_benign,
        }
    }
}

//! Prediction endpoint

use crate::inference::{self, PredictRequest, PredictResponse};
use crate::server::{error::ApiError, state::ServerState};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::time::Instant;
use tracing::{debug, error};

/// `POST /predict`
///
/// Validation failures are answered before the engine runs and never touch the
/// prediction counters or the fault policy. Only successful predictions are
/// timed and counted.
pub async fn predict(
    State(state): State<ServerState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) = payload?;
    let features = inference::validate(&request.features, state.expected_features())?;

    let start = Instant::now();
    match inference::predict(&state.bundle, &features) {
        Ok(result) => {
            state.metrics.observe_latency(start.elapsed().as_secs_f64());
            state.metrics.record_prediction(result.diagnosis);
            state.health.record_success();
            debug!(
                diagnosis = %result.diagnosis,
                probability_benign = result.probability_benign,
                "Prediction served"
            );
            Ok(Json(result.into()))
        }
        Err(fault) => {
            error!(kind = fault.kind(), "Inference fault: {}", fault);
            state.health.record_fault(fault.to_string());
            Err(fault.into())
        }
    }
}

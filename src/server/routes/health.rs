//! Health and readiness endpoints

use crate::health::HealthReport;
use crate::server::state::ServerState;
use axum::{extract::State, http::StatusCode, Json};

/// `GET /health`. Always answers; the body carries the verdict.
pub async fn health(State(state): State<ServerState>) -> Json<HealthReport> {
    Json(state.health.report())
}

/// `GET /ready`. 503 unless the service is ready or serving.
pub async fn ready(State(state): State<ServerState>) -> (StatusCode, Json<HealthReport>) {
    let status = if state.health.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(state.health.report()))
}

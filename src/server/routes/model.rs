//! Model description endpoint

use crate::model::ModelDescription;
use crate::server::state::ServerState;
use axum::{extract::State, Json};

/// `GET /model`: feature order, kernel and label mapping of the loaded bundle
pub async fn describe(State(state): State<ServerState>) -> Json<ModelDescription> {
    Json(state.bundle.describe())
}

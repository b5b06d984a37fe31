//! API route handlers

pub mod health;
pub mod model;
pub mod predict;

use crate::server::state::ServerState;
use axum::{
    routing::{get, post},
    Router,
};

/// Routes served on the API listener
pub fn create_router() -> Router<ServerState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/predict", post(predict::predict))
        .route("/model", get(model::describe))
}

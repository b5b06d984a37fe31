//! svmserve HTTP layer
//!
//! Two listeners:
//! - the API router (`/health`, `/ready`, `/predict`, `/model`)
//! - the metrics router (`/metrics`), scraped by Prometheus

use crate::config::AppConfig;
use crate::metrics::MetricsRecorder;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::header,
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::ApiError;
use state::ServerState;

/// Create the API router
pub fn create_app(state: ServerState) -> Router {
    let cors_config = state.config.cors.clone();
    let timeout_duration = Duration::from_secs(state.config.request_timeout_secs);

    let mut app = routes::create_router()
        // Only matched routes are counted
        .route_layer(from_fn_with_state(state.clone(), middleware::track_requests))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(timeout_duration))
                .layer(from_fn(middleware::logging_middleware)),
        )
        .with_state(state);

    // CORS is outermost
    if cors_config.enabled {
        app = app.layer(middleware::cors_layer(&cors_config));
    }

    app
}

/// Create the metrics router
pub fn create_metrics_app(recorder: Arc<dyn MetricsRecorder>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(recorder)
}

async fn metrics_handler(State(recorder): State<Arc<dyn MetricsRecorder>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
        recorder.snapshot(),
    )
}

/// Bind both listeners and serve until Ctrl-C or SIGTERM
pub async fn start_server(
    config: &AppConfig,
    state: ServerState,
    recorder: Arc<dyn MetricsRecorder>,
) -> Result<()> {
    let api_addr = config.server.bind_addr();
    let api_listener = TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind api listener on {}", api_addr))?;
    info!("Serving predictions on http://{}", api_listener.local_addr()?);

    let metrics_listener = if config.metrics.enabled {
        let metrics_addr = config.metrics.bind_addr();
        let listener = TcpListener::bind(&metrics_addr)
            .await
            .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
        info!("Serving metrics on http://{}/metrics", listener.local_addr()?);
        Some(listener)
    } else {
        info!("Metrics listener disabled");
        None
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let api = {
        let rx = shutdown_rx.clone();
        let app = create_app(state);
        async move {
            axum::serve(api_listener, app)
                .with_graceful_shutdown(wait_for_shutdown(rx))
                .await
        }
    };
    let metrics = async move {
        match metrics_listener {
            Some(listener) => {
                axum::serve(listener, create_metrics_app(recorder))
                    .with_graceful_shutdown(wait_for_shutdown(shutdown_rx))
                    .await
            }
            None => Ok(()),
        }
    };

    futures::future::try_join(api, metrics)
        .await
        .context("server error")?;
    info!("Server stopped");
    Ok(())
}

async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    while !*rx.borrow() {
        if rx.changed().await.is_err() {
            return;
        }
    }
}

/// Resolve on Ctrl-C or, on unix, SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

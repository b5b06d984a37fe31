//! Server state management

use crate::health::HealthReporter;
use crate::metrics::MetricsRecorder;
use crate::model::ModelBundle;
use std::sync::Arc;

pub use crate::config::{CorsConfig, ServerConfig};

/// Shared server state, cloned into every handler
#[derive(Clone)]
pub struct ServerState {
    /// Loaded model bundle, read-only for the process lifetime
    pub bundle: Arc<ModelBundle>,

    /// Metrics recorder
    pub metrics: Arc<dyn MetricsRecorder>,

    /// Lifecycle and fault tracking
    pub health: Arc<HealthReporter>,

    /// API listener configuration
    pub config: Arc<ServerConfig>,
}

impl ServerState {
    pub fn new(
        bundle: Arc<ModelBundle>,
        metrics: Arc<dyn MetricsRecorder>,
        health: Arc<HealthReporter>,
        config: ServerConfig,
    ) -> Self {
        Self {
            bundle,
            metrics,
            health,
            config: Arc::new(config),
        }
    }

    /// Width every inbound feature vector must have
    pub fn expected_features(&self) -> usize {
        self.bundle.n_features()
    }
}

//! svmserve core library.
//!
//! Serves predictions from a pre-trained support-vector classifier over a fixed
//! width feature vector. The request path is:
//!
//! ```text
//! HTTP router ─▶ validation ─▶ inference engine ─▶ metrics recorder ─▶ response
//!                                                        ▲
//! health reporter (queried out of band) ─────────────────┘ fault policy
//! ```
//!
//! The model bundle is loaded once at startup and shared read-only; metrics and
//! health state are the only mutable shared resources and both are lock-free on
//! the hot path.

pub mod cli;
pub mod config;
pub mod error;
pub mod health;
pub mod inference;
pub mod metrics;
pub mod model;
pub mod server;

pub use config::{AppConfig, AppConfigBuilder};
pub use error::{Error, Result};
pub use health::{HealthReporter, ServiceState, VersionTag};
pub use inference::{FeatureVector, PredictionResult, ValidationError};
pub use metrics::{MetricsRecorder, PrometheusRecorder};
pub use model::{Diagnosis, ModelBundle};

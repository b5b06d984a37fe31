//! Error types for the svmserve service.

use crate::model::ArtifactError;
use thiserror::Error;

/// A specialized Result type for svmserve operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that stop the process before it starts serving.
#[derive(Debug, Error)]
pub enum Error {
    /// Model artifacts are missing, corrupt or inconsistent.
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metric registration errors
    #[error("Metrics error: {0}")]
    Metrics(String),
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<prometheus::Error> for Error {
    fn from(err: prometheus::Error) -> Self {
        Error::Metrics(err.to_string())
    }
}

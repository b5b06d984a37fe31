//! Loading of the exported model artifacts.
//!
//! The training pipeline writes three JSON documents into a single directory.
//! [`load_bundle`] reads all of them, validates each one and cross-checks their
//! widths before handing back a [`ModelBundle`]. Every failure here is fatal to
//! process start; there is no retry.

use super::scaler::StandardScaler;
use super::svm::{SvmArtifact, SvmClassifier};
use super::ModelBundle;
use crate::config::ModelConfig;
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while loading or validating model artifacts.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("artifact not found: {path}")]
    Missing { path: PathBuf },

    #[error("failed to read artifact {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupt artifact {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("dimension mismatch in {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid {artifact} artifact: {reason}")]
    Invalid {
        artifact: &'static str,
        reason: String,
    },

    #[error("label contract violated: {0}")]
    LabelContract(String),
}

/// Resolved locations of the three artifact files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub scaler: PathBuf,
    pub features: PathBuf,
}

impl ArtifactPaths {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            model: config.dir.join(&config.model_file),
            scaler: config.dir.join(&config.scaler_file),
            features: config.dir.join(&config.features_file),
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ArtifactError::Missing {
            path: path.to_path_buf(),
        },
        _ => ArtifactError::Read {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "Read artifact");
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Load artifacts from explicit paths without an expected width.
pub fn load_from_paths(paths: &ArtifactPaths) -> Result<ModelBundle, ArtifactError> {
    let feature_order: Vec<String> = read_json(&paths.features)?;
    let scaler = read_json::<StandardScaler>(&paths.scaler)?.validated()?;
    let classifier = SvmClassifier::try_from(read_json::<SvmArtifact>(&paths.model)?)?;
    ModelBundle::new(classifier, scaler, feature_order)
}

/// Load and validate the bundle described by `config`.
pub fn load_bundle(config: &ModelConfig) -> Result<ModelBundle, ArtifactError> {
    let paths = ArtifactPaths::from_config(config);
    let bundle = load_from_paths(&paths)?;

    if bundle.n_features() != config.expected_features {
        return Err(ArtifactError::DimensionMismatch {
            what: "feature_names",
            expected: config.expected_features,
            actual: bundle.n_features(),
        });
    }

    info!(
        dir = %config.dir.display(),
        features = bundle.n_features(),
        kernel = bundle.classifier().kernel().name(),
        support_vectors = bundle.classifier().n_support_vectors(),
        "Model bundle loaded"
    );
    Ok(bundle)
}

//! Immutable model bundle: classifier, scaler and feature order.
//!
//! The bundle is assembled once by [`artifacts::load_bundle`] and then shared
//! behind an `Arc` for the lifetime of the process. Nothing in here mutates after
//! construction.

pub mod artifacts;
pub mod scaler;
pub mod svm;

pub use artifacts::{load_bundle, ArtifactError, ArtifactPaths};
pub use scaler::StandardScaler;
pub use svm::{Kernel, SvmClassifier};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Domain label for the binary classifier.
///
/// The numeric codes are part of the artifact contract: class `0` is malignant
/// and class `1` is benign. [`SvmClassifier`] construction verifies that the
/// exported `target_names` agree with this mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Diagnosis {
    Malignant,
    Benign,
}

impl Diagnosis {
    pub const ALL: [Diagnosis; 2] = [Diagnosis::Malignant, Diagnosis::Benign];

    /// Map a classifier class value onto a diagnosis.
    pub fn from_class(class: i64) -> Option<Self> {
        match class {
            0 => Some(Diagnosis::Malignant),
            1 => Some(Diagnosis::Benign),
            _ => None,
        }
    }

    /// Numeric code exposed as `prediction` on the wire.
    pub fn code(self) -> u8 {
        match self {
            Diagnosis::Malignant => 0,
            Diagnosis::Benign => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Diagnosis::Malignant => "malignant",
            Diagnosis::Benign => "benign",
        }
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loaded classifier + scaler + feature order triple.
#[derive(Debug)]
pub struct ModelBundle {
    classifier: SvmClassifier,
    scaler: StandardScaler,
    feature_order: Vec<String>,
    loaded_at: DateTime<Utc>,
}

impl ModelBundle {
    /// Assemble a bundle, checking that all three parts agree on the input width.
    pub fn new(
        classifier: SvmClassifier,
        scaler: StandardScaler,
        feature_order: Vec<String>,
    ) -> Result<Self, ArtifactError> {
        if feature_order.is_empty() {
            return Err(ArtifactError::Invalid {
                artifact: "feature_names",
                reason: "feature list is empty".to_string(),
            });
        }

        let mut seen = HashSet::with_capacity(feature_order.len());
        for name in &feature_order {
            if !seen.insert(name.as_str()) {
                return Err(ArtifactError::Invalid {
                    artifact: "feature_names",
                    reason: format!("duplicate feature name '{}'", name),
                });
            }
        }

        let width = feature_order.len();
        if scaler.n_features() != width {
            return Err(ArtifactError::DimensionMismatch {
                what: "scaler",
                expected: width,
                actual: scaler.n_features(),
            });
        }
        if classifier.n_features() != width {
            return Err(ArtifactError::DimensionMismatch {
                what: "classifier support vectors",
                expected: width,
                actual: classifier.n_features(),
            });
        }

        Ok(Self {
            classifier,
            scaler,
            feature_order,
            loaded_at: Utc::now(),
        })
    }

    /// Width of the feature vector the bundle accepts.
    pub fn n_features(&self) -> usize {
        self.feature_order.len()
    }

    pub fn feature_order(&self) -> &[String] {
        &self.feature_order
    }

    pub fn classifier(&self) -> &SvmClassifier {
        &self.classifier
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Summary served on `GET /model` and printed by `svmserve inspect`.
    pub fn describe(&self) -> ModelDescription {
        ModelDescription {
            classifier: "svc".to_string(),
            kernel: self.classifier.kernel().name().to_string(),
            n_features: self.n_features(),
            n_support_vectors: self.classifier.n_support_vectors(),
            feature_names: self.feature_order.clone(),
            labels: Diagnosis::ALL
                .iter()
                .map(|d| LabelMapping {
                    prediction: d.code(),
                    diagnosis: *d,
                })
                .collect(),
            loaded_at: self.loaded_at,
        }
    }
}

/// One entry of the class-code to diagnosis contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelMapping {
    pub prediction: u8,
    pub diagnosis: Diagnosis,
}

/// Serializable description of a loaded bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDescription {
    pub classifier: String,
    pub kernel: String,
    pub n_features: usize,
    pub n_support_vectors: usize,
    pub feature_names: Vec<String>,
    pub labels: Vec<LabelMapping>,
    pub loaded_at: DateTime<Utc>,
}

//! Standard scaler fitted at training time.

use super::artifacts::ArtifactError;
use serde::{Deserialize, Serialize};

/// Per-feature `(x - mean) / scale` transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Build a scaler from fitted statistics.
    ///
    /// A `scale` of exactly zero marks a constant training feature and is
    /// replaced by `1.0`, so such features are centred but not divided.
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ArtifactError> {
        Self { mean, scale }.validated()
    }

    /// Check a deserialized scaler and normalise zero scales.
    pub(crate) fn validated(mut self) -> Result<Self, ArtifactError> {
        if self.mean.len() != self.scale.len() {
            return Err(ArtifactError::DimensionMismatch {
                what: "scaler scale",
                expected: self.mean.len(),
                actual: self.scale.len(),
            });
        }
        if self.mean.is_empty() {
            return Err(ArtifactError::Invalid {
                artifact: "scaler",
                reason: "scaler has no features".to_string(),
            });
        }
        if let Some(i) = self.mean.iter().position(|m| !m.is_finite()) {
            return Err(ArtifactError::Invalid {
                artifact: "scaler",
                reason: format!("mean[{}] is not finite", i),
            });
        }
        for (i, s) in self.scale.iter_mut().enumerate() {
            if !s.is_finite() || *s < 0.0 {
                return Err(ArtifactError::Invalid {
                    artifact: "scaler",
                    reason: format!("scale[{}] must be a finite non-negative number", i),
                });
            }
            if *s == 0.0 {
                *s = 1.0;
            }
        }
        Ok(self)
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    /// Normalise a raw vector. The caller guarantees `x.len() == n_features()`.
    pub fn transform(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }
}

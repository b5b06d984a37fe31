//! Feature vector validation.

use serde::Serialize;
use serde_json::value::RawValue;
use serde_json::Value;
use thiserror::Error;

/// Reasons an inbound feature vector is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("expected {expected} features, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("feature at index {index} is not a finite number")]
    NonNumericElement { index: usize },
}

impl ValidationError {
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::WrongLength { .. } => "wrong_length",
            ValidationError::NonNumericElement { .. } => "non_numeric_element",
        }
    }
}

/// A feature vector that passed validation. Every element is finite.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Validate already-parsed floats. NaN and infinities are non-numeric.
    pub fn try_from_slice(values: &[f64], expected: usize) -> Result<Self, ValidationError> {
        check_length(values.len(), expected)?;
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(ValidationError::NonNumericElement { index });
        }
        Ok(Self(values.to_vec()))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

fn check_length(actual: usize, expected: usize) -> Result<(), ValidationError> {
    if actual != expected {
        return Err(ValidationError::WrongLength { expected, actual });
    }
    Ok(())
}

/// One inbound element of a feature array, not yet known to be a number.
pub trait FeatureElement {
    /// The element as a finite `f64`, or `None` if it is anything else.
    fn as_finite_f64(&self) -> Option<f64>;
}

impl FeatureElement for Value {
    fn as_finite_f64(&self) -> Option<f64> {
        self.as_f64().filter(|v| v.is_finite())
    }
}

/// Unparsed JSON text. Literals outside the `f64` range such as `1e400` fail
/// here instead of failing the whole body.
impl FeatureElement for RawValue {
    fn as_finite_f64(&self) -> Option<f64> {
        serde_json::from_str::<f64>(self.get())
            .ok()
            .filter(|v| v.is_finite())
    }
}

impl<T: FeatureElement + ?Sized> FeatureElement for Box<T> {
    fn as_finite_f64(&self) -> Option<f64> {
        (**self).as_finite_f64()
    }
}

/// Validate JSON elements against the expected width.
///
/// Length is checked first; otherwise the first element that is not a finite
/// JSON number is reported.
pub fn validate<T: FeatureElement>(
    values: &[T],
    expected: usize,
) -> Result<FeatureVector, ValidationError> {
    check_length(values.len(), expected)?;

    let mut out = Vec::with_capacity(expected);
    for (index, value) in values.iter().enumerate() {
        match value.as_finite_f64() {
            Some(v) => out.push(v),
            None => return Err(ValidationError::NonNumericElement { index }),
        }
    }
    Ok(FeatureVector(out))
}

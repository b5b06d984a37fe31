//! Request path: validation, scaling and classification.

pub mod engine;
pub mod request;
pub mod response;
pub mod validation;

pub use engine::{predict, round_probability, InferenceFault, PredictionResult};
pub use request::PredictRequest;
pub use response::PredictResponse;
pub use validation::{validate, FeatureElement, FeatureVector, ValidationError};

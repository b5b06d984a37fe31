use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// Body of `POST /predict`.
///
/// Elements are kept as unparsed JSON so that a non-numeric or out-of-range
/// entry is reported with its index instead of failing the whole body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub features: Vec<Box<RawValue>>,
}

//! HTTP error responses

use crate::inference::{InferenceFault, ValidationError};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Errors surfaced by API handlers. Every variant renders as a JSON object
/// with `error`, `kind` and `message`.
#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    MalformedRequest { status: StatusCode, kind: &'static str, message: String },
    Inference(InferenceFault),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::MalformedRequest { status, .. } => *status,
            ApiError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        match self {
            ApiError::Validation(err) => tagged("validation_error", err, err.to_string()),
            ApiError::MalformedRequest { kind, message, .. } => json!({
                "error": "malformed_request",
                "kind": kind,
                "message": message,
            }),
            ApiError::Inference(fault) => tagged("inference_fault", fault, fault.to_string()),
        }
    }
}

/// Serialize a `kind`-tagged error and add the `error` and `message` fields.
fn tagged<T: Serialize>(error: &str, detail: &T, message: String) -> Value {
    let mut body = match serde_json::to_value(detail) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    body.insert("error".to_string(), Value::from(error));
    body.insert("message".to_string(), Value::from(message));
    Value::Object(body)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<InferenceFault> for ApiError {
    fn from(fault: InferenceFault) -> Self {
        ApiError::Inference(fault)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let (status, kind) = match &rejection {
            JsonRejection::MissingJsonContentType(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "missing_content_type")
            }
            _ => (StatusCode::BAD_REQUEST, "malformed_body"),
        };
        ApiError::MalformedRequest {
            status,
            kind,
            message: rejection.body_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_body() {
        let err = ApiError::from(ValidationError::WrongLength {
            expected: 30,
            actual: 0,
        });
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = err.body();
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["kind"], "wrong_length");
        assert_eq!(body["expected"], 30);
        assert_eq!(body["actual"], 0);
        assert_eq!(body["message"], "expected 30 features, got 0");
    }

    #[test]
    fn test_inference_body() {
        let err = ApiError::from(InferenceFault::NonFiniteDecision);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = err.body();
        assert_eq!(body["error"], "inference_fault");
        assert_eq!(body["kind"], "non_finite_decision");
    }
}

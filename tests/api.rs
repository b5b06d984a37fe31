mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{features, post_text, send, send_raw, TestService, WIDTH};
use serde_json::json;
use svmserve_core::{Diagnosis, ServiceState};

#[tokio::test]
async fn test_health_reports_version() {
    let service = TestService::new("canary");
    let (status, body) = service.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model"], "SVM loaded");
    assert_eq!(body["model_loaded"], true);
    assert_eq!(body["version"], "canary");
    assert_eq!(body["state"], "ready");
}

#[tokio::test]
async fn test_stable_and_canary_report_distinct_versions() {
    let stable = TestService::new("stable");
    let canary = TestService::new("canary");

    let (_, a) = stable.get("/health").await;
    let (_, b) = canary.get("/health").await;
    assert_eq!(a["version"], "stable");
    assert_eq!(b["version"], "canary");

    // Version is fixed for the process lifetime
    stable.predict(json!({ "features": features(1.0) })).await;
    let (_, a) = stable.get("/health").await;
    assert_eq!(a["version"], "stable");
}

#[tokio::test]
async fn test_ready_endpoint() {
    let service = TestService::new("stable");
    let (status, body) = service.get("/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "ready");
}

#[tokio::test]
async fn test_predict_benign() {
    let service = TestService::new("stable");
    let (status, body) = service.predict(json!({ "features": features(1.0) })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"prediction": 1, "diagnosis": "benign", "probability_benign": 0.8808})
    );
    assert_eq!(service.health.state(), ServiceState::Serving);
}

#[tokio::test]
async fn test_predict_malignant() {
    let service = TestService::new("stable");
    let (status, body) = service.predict(json!({ "features": features(-1.0) })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], 0);
    assert_eq!(body["diagnosis"], "malignant");
    assert_eq!(body["probability_benign"], 0.1192);
}

#[tokio::test]
async fn test_label_matches_diagnosis() {
    let service = TestService::new("stable");
    for x0 in [-3.0, -0.2, 0.0, 0.2, 3.0] {
        let (_, body) = service.predict(json!({ "features": features(x0) })).await;
        let p = body["probability_benign"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&p));
        let benign = body["diagnosis"] == "benign";
        assert_eq!(body["prediction"] == 1, benign);
    }
}

#[tokio::test]
async fn test_empty_features_is_wrong_length() {
    let service = TestService::new("stable");
    let (status, body) = service.predict(json!({ "features": [] })).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["kind"], "wrong_length");
    assert_eq!(body["expected"], 30);
    assert_eq!(body["actual"], 0);

    // Validation failures never reach the engine
    assert_eq!(service.recorder.latency_sample_count(), 0);
    assert_eq!(service.recorder.prediction_count(Diagnosis::Benign), 0);
    assert_eq!(service.recorder.prediction_count(Diagnosis::Malignant), 0);
    assert_eq!(service.recorder.request_count("/predict", "POST"), 1);
}

#[tokio::test]
async fn test_non_numeric_element() {
    let service = TestService::new("stable");
    let mut values: Vec<serde_json::Value> = features(0.5).into_iter().map(|v| json!(v)).collect();
    values[4] = json!("large");
    values[9] = json!(null);

    let (status, body) = service.predict(json!({ "features": values })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "non_numeric_element");
    assert_eq!(body["index"], 4);
}

#[tokio::test]
async fn test_out_of_range_number_is_non_numeric() {
    let service = TestService::new("stable");
    let mut values: Vec<String> = (0..WIDTH).map(|i| format!("{}.5", i)).collect();
    values[3] = "1e400".to_string();
    let body = format!(r#"{{"features": [{}]}}"#, values.join(", "));

    let (status, body) = send(&service.app, post_text("/predict", &body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["kind"], "non_numeric_element");
    assert_eq!(body["index"], 3);
    assert_eq!(service.health.consecutive_faults(), 0);
}

#[tokio::test]
async fn test_malformed_bodies() {
    let service = TestService::new("stable");

    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&service.app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "malformed_request");
    assert_eq!(body["kind"], "malformed_body");

    let (status, body) = service.predict(json!({ "values": [1.0] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "malformed_body");

    let (status, body) = service.predict(json!({ "features": "1,2,3" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "malformed_body");

    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .body(Body::from(r#"{"features": []}"#))
        .unwrap();
    let (status, body) = send(&service.app, request).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["kind"], "missing_content_type");
}

#[tokio::test]
async fn test_model_description() {
    let service = TestService::new("stable");
    let (status, body) = service.get("/model").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["classifier"], "svc");
    assert_eq!(body["kernel"], "linear");
    assert_eq!(body["n_features"], WIDTH);
    assert_eq!(body["feature_names"].as_array().unwrap().len(), WIDTH);
    assert_eq!(body["labels"][0]["diagnosis"], "malignant");
    assert_eq!(body["labels"][1]["prediction"], 1);
}

#[tokio::test]
async fn test_requests_are_counted_by_route() {
    let service = TestService::new("stable");
    service.get("/health").await;
    service.get("/health").await;
    service.predict(json!({ "features": features(1.0) })).await;
    service.predict(json!({ "features": [1.0] })).await;

    let (status, _) = service.get("/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(service.recorder.request_count("/health", "GET"), 2);
    assert_eq!(service.recorder.request_count("/predict", "POST"), 2);
    assert_eq!(service.recorder.prediction_count(Diagnosis::Benign), 1);
    assert_eq!(service.recorder.latency_sample_count(), 1);

    let (status, text) = send_raw(&service.metrics_app, common::get("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains(r#"app_requests_total{endpoint="/health",method="GET"} 2"#));
    assert!(text.contains(r#"app_predictions_total{prediction="benign"} 1"#));
    assert!(text.contains(r#"app_info{version="stable"} 1"#));
    assert!(!text.contains("does-not-exist"));
}

#[tokio::test]
async fn test_single_fault_does_not_flip_health() {
    let service = TestService::with_options("canary", 1e300, 3);

    let (status, body) = service.predict(json!({ "features": features(1e300) })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "inference_fault");
    assert_eq!(body["kind"], "non_finite_decision");

    let (_, health) = service.get("/health").await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["fault_count"], 1);
    assert!(health["last_fault"].is_string());

    // A success resets the run of faults
    let (status, _) = service.predict(json!({ "features": features(1.0) })).await;
    assert_eq!(status, StatusCode::OK);
    let (_, health) = service.get("/health").await;
    assert_eq!(health["fault_count"], 0);

    // Faults are not counted as predictions
    assert_eq!(service.recorder.latency_sample_count(), 1);
}

#[tokio::test]
async fn test_consecutive_faults_degrade() {
    let service = TestService::with_options("canary", 1e300, 3);

    for _ in 0..3 {
        let (status, _) = service.predict(json!({ "features": features(1e300) })).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    let (status, health) = service.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "unhealthy");
    assert_eq!(health["state"], "degraded");

    let (status, _) = service.get("/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    // Degraded is terminal
    service.predict(json!({ "features": features(1.0) })).await;
    assert_eq!(service.health.state(), ServiceState::Degraded);
}

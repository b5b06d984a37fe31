//! Common test utilities: synthetic model bundles and an in-process router.
//!
//! The synthetic bundle is a linear SVM with identity scaling, one support
//! vector `sv0 * e_0` and Platt parameters `A = -2, B = 0`, so for
//! `sv0 = 1` the benign probability is `logistic(2 * x0)`.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use svmserve_core::config::{ModelConfig, ServerConfig};
use svmserve_core::model::{load_bundle, svm::SvmArtifact, Kernel};
use svmserve_core::server::{create_app, create_metrics_app, state::ServerState};
use svmserve_core::{HealthReporter, MetricsRecorder, PrometheusRecorder, VersionTag};
use tempfile::TempDir;
use tower::ServiceExt;

pub const WIDTH: usize = 30;

pub fn feature_names(width: usize) -> Vec<String> {
    (0..width).map(|i| format!("feature_{}", i)).collect()
}

pub fn linear_artifact(width: usize, sv0: f64) -> SvmArtifact {
    let mut sv = vec![0.0; width];
    sv[0] = sv0;
    SvmArtifact {
        kernel: Kernel::Linear,
        support_vectors: vec![sv],
        dual_coef: vec![1.0],
        intercept: 0.0,
        prob_a: -2.0,
        prob_b: 0.0,
        classes: vec![0, 1],
        target_names: vec!["malignant".to_string(), "benign".to_string()],
    }
}

fn write_json(dir: &Path, name: &str, value: &impl serde::Serialize) {
    std::fs::write(dir.join(name), serde_json::to_vec_pretty(value).unwrap()).unwrap();
}

/// Write all three artifacts for `artifact` with identity scaling.
pub fn write_bundle(dir: &Path, artifact: &SvmArtifact) {
    let width = artifact.support_vectors[0].len();
    write_json(dir, "feature_names.json", &feature_names(width));
    write_json(
        dir,
        "scaler.json",
        &json!({"mean": vec![0.0; width], "scale": vec![1.0; width]}),
    );
    write_json(dir, "model.json", artifact);
}

pub fn model_config(dir: &Path, width: usize) -> ModelConfig {
    ModelConfig {
        dir: dir.to_path_buf(),
        expected_features: width,
        ..ModelConfig::default()
    }
}

/// Feature vector `x0 * e_0` of the standard width.
pub fn features(x0: f64) -> Vec<f64> {
    let mut x = vec![0.0; WIDTH];
    x[0] = x0;
    x
}

pub struct TestService {
    pub app: Router,
    pub metrics_app: Router,
    pub recorder: Arc<PrometheusRecorder>,
    pub health: Arc<HealthReporter>,
    _dir: TempDir,
}

impl TestService {
    pub fn new(version: &str) -> Self {
        Self::with_options(version, 1.0, 5)
    }

    /// `sv0` scales the support vector; a huge value lets a huge input overflow
    /// the decision function.
    pub fn with_options(version: &str, sv0: f64, fault_threshold: u32) -> Self {
        let dir = TempDir::new().unwrap();
        write_bundle(dir.path(), &linear_artifact(WIDTH, sv0));
        let bundle = Arc::new(load_bundle(&model_config(dir.path(), WIDTH)).unwrap());

        let recorder = Arc::new(PrometheusRecorder::with_default_buckets(version).unwrap());
        let dyn_recorder: Arc<dyn MetricsRecorder> = recorder.clone();
        let health = Arc::new(HealthReporter::new(VersionTag::new(version), fault_threshold));

        let state = ServerState::new(
            bundle,
            dyn_recorder.clone(),
            health.clone(),
            ServerConfig::default(),
        );
        health.mark_ready();

        Self {
            app: create_app(state),
            metrics_app: create_metrics_app(dyn_recorder),
            recorder,
            health,
            _dir: dir,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        send(&self.app, get(uri)).await
    }

    pub async fn predict(&self, body: Value) -> (StatusCode, Value) {
        send(&self.app, post_json("/predict", &body)).await
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// JSON request with a body written by hand, for literals `json!` cannot hold.
pub fn post_text(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send_raw(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send_raw(app, request).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };
    (status, value)
}

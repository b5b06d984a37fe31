//! Prometheus metrics for the prediction service.
//!
//! Handlers talk to a [`MetricsRecorder`]; the production implementation is
//! [`PrometheusRecorder`], which owns its own [`Registry`] so that several
//! recorders (one per test, or one per process) never share global state.

use crate::model::Diagnosis;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Default latency buckets, in seconds.
pub const DEFAULT_LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

/// Counter and histogram capabilities the request path depends on.
pub trait MetricsRecorder: Send + Sync {
    /// Count one request against a route template and method.
    fn record_request(&self, endpoint: &str, method: &str);

    /// Count one successfully completed prediction.
    fn record_prediction(&self, diagnosis: Diagnosis);

    /// Observe the duration of one successful inference.
    fn observe_latency(&self, seconds: f64);

    /// Render all metrics in the Prometheus text exposition format.
    fn snapshot(&self) -> String;
}

/// [`MetricsRecorder`] backed by the `prometheus` crate.
#[derive(Clone)]
pub struct PrometheusRecorder {
    registry: Arc<Registry>,
    requests_total: IntCounterVec,
    predictions_total: IntCounterVec,
    prediction_latency: Histogram,
    info: IntGaugeVec,
}

impl PrometheusRecorder {
    pub fn new(latency_buckets: Vec<f64>, version: &str) -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("app_requests_total", "Total number of requests"),
            &["endpoint", "method"],
        )?;
        let predictions_total = IntCounterVec::new(
            Opts::new("app_predictions_total", "Total predictions by class"),
            &["prediction"],
        )?;
        let prediction_latency = Histogram::with_opts(
            HistogramOpts::new(
                "app_prediction_latency_seconds",
                "Time spent scaling and classifying one feature vector",
            )
            .buckets(latency_buckets),
        )?;
        let info = IntGaugeVec::new(
            Opts::new("app_info", "Deployment version of this instance"),
            &["version"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(predictions_total.clone()))?;
        registry.register(Box::new(prediction_latency.clone()))?;
        registry.register(Box::new(info.clone()))?;

        // Both classes are exported from the first scrape.
        for diagnosis in Diagnosis::ALL {
            predictions_total.with_label_values(&[diagnosis.as_str()]);
        }
        info.with_label_values(&[version]).set(1);

        Ok(Self {
            registry: Arc::new(registry),
            requests_total,
            predictions_total,
            prediction_latency,
            info,
        })
    }

    pub fn with_default_buckets(version: &str) -> Result<Self, prometheus::Error> {
        Self::new(DEFAULT_LATENCY_BUCKETS.to_vec(), version)
    }

    pub fn request_count(&self, endpoint: &str, method: &str) -> u64 {
        self.requests_total.with_label_values(&[endpoint, method]).get()
    }

    pub fn prediction_count(&self, diagnosis: Diagnosis) -> u64 {
        self.predictions_total
            .with_label_values(&[diagnosis.as_str()])
            .get()
    }

    pub fn latency_sample_count(&self) -> u64 {
        self.prediction_latency.get_sample_count()
    }

    pub fn version_info(&self, version: &str) -> i64 {
        self.info.with_label_values(&[version]).get()
    }
}

impl MetricsRecorder for PrometheusRecorder {
    fn record_request(&self, endpoint: &str, method: &str) {
        self.requests_total.with_label_values(&[endpoint, method]).inc();
    }

    fn record_prediction(&self, diagnosis: Diagnosis) {
        self.predictions_total
            .with_label_values(&[diagnosis.as_str()])
            .inc();
    }

    fn observe_latency(&self, seconds: f64) {
        self.prediction_latency.observe(seconds);
    }

    fn snapshot(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buffer) {
            tracing::error!("Failed to encode metrics: {}", e);
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

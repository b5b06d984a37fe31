//! Command handlers

use super::commands::{ConfigFormat, PredictCommand};
use crate::config::AppConfig;
use crate::health::HealthReporter;
use crate::inference::{self, FeatureVector, PredictRequest, PredictResponse};
use crate::metrics::{MetricsRecorder, PrometheusRecorder};
use crate::model::{load_bundle, ModelBundle};
use crate::server::{self, state::ServerState};
use anyhow::{bail, Context, Result};
use serde_json::value::RawValue;
use std::sync::Arc;
use tracing::{error, info};

fn load(config: &AppConfig) -> Result<ModelBundle> {
    load_bundle(&config.model)
        .with_context(|| format!("failed to load model from {}", config.model.dir.display()))
}

/// Load the bundle and register metrics. Any failure here stops the process
/// before a listener is bound.
fn build_state(
    config: &AppConfig,
) -> crate::Result<(ServerState, Arc<dyn MetricsRecorder>)> {
    let bundle = Arc::new(load_bundle(&config.model)?);
    let recorder: Arc<dyn MetricsRecorder> = Arc::new(PrometheusRecorder::new(
        config.metrics.latency_buckets.clone(),
        config.deployment.version.as_str(),
    )?);
    let health = Arc::new(HealthReporter::new(
        config.deployment.version.clone(),
        config.health.fault_threshold,
    ));

    let state = ServerState::new(bundle, recorder.clone(), health, config.server.clone());
    Ok((state, recorder))
}

/// Load the bundle, wire up shared state and serve until shutdown.
pub async fn handle_serve(config: AppConfig) -> Result<()> {
    info!(
        version = %config.deployment.version,
        model_dir = %config.model.dir.display(),
        "Starting svmserve"
    );

    let (state, recorder) = build_state(&config).map_err(|e| {
        error!(error = %e, "Startup failed");
        e
    })?;
    state.health.mark_ready();

    server::start_server(&config, state, recorder).await
}

/// Load and validate the bundle, printing its description.
pub fn handle_inspect(config: &AppConfig) -> Result<()> {
    let bundle = load(config)?;
    let description = bundle.describe();
    println!("{}", serde_json::to_string_pretty(&description)?);
    Ok(())
}

/// Read the feature vector for an offline prediction.
fn read_features(cmd: &PredictCommand, expected: usize) -> Result<FeatureVector> {
    if let Some(values) = &cmd.features {
        return Ok(FeatureVector::try_from_slice(values, expected)?);
    }
    let Some(path) = &cmd.input else {
        bail!("either --features or --input is required");
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let values = parse_feature_file(&contents).with_context(|| {
        format!("{} must hold a feature array or a request body", path.display())
    })?;
    Ok(inference::validate(&values, expected)?)
}

/// Accept either a bare array or a `/predict` request body.
fn parse_feature_file(contents: &str) -> serde_json::Result<Vec<Box<RawValue>>> {
    serde_json::from_str::<Vec<Box<RawValue>>>(contents)
        .or_else(|_| serde_json::from_str::<PredictRequest>(contents).map(|r| r.features))
}

/// Run one prediction and print the response body.
pub fn handle_predict(config: &AppConfig, cmd: &PredictCommand) -> Result<()> {
    let bundle = load(config)?;
    let features = read_features(cmd, bundle.n_features())?;
    let result = inference::predict(&bundle, &features)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&PredictResponse::from(result))?
    );
    Ok(())
}

/// Print the effective merged configuration.
pub fn handle_config(config: &AppConfig, format: ConfigFormat) -> Result<()> {
    let text = match format {
        ConfigFormat::Toml => config.to_toml()?,
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    println!("{}", text);
    Ok(())
}

//! Layered configuration for svmserve
//!
//! Sources, lowest priority first:
//! - built-in defaults (`AppConfig::default()`)
//! - an optional config file (toml, json or yaml)
//! - `SVMSERVE__SECTION__KEY` environment variables
//! - flat overrides such as `SVMSERVE_PORT`, `VERSION` and `MODEL_DIR`
//! - command line flags, applied by the CLI through [`AppConfigBuilder`]

pub mod server;

pub use server::{CorsConfig, ServerConfig, ServerConfigBuilder};

use crate::error::{Error, Result};
use crate::health::{VersionTag, DEFAULT_FAULT_THRESHOLD};
use crate::metrics::DEFAULT_LATENCY_BUCKETS;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub deployment: DeploymentConfig,

    #[serde(default)]
    pub health: HealthConfig,
}

/// Metrics listener and histogram layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_metrics_host")]
    pub host: String,

    #[serde(default = "default_metrics_port")]
    pub port: u16,

    #[serde(default = "default_latency_buckets")]
    pub latency_buckets: Vec<f64>,
}

fn default_true() -> bool {
    true
}
fn default_metrics_host() -> String {
    "0.0.0.0".to_string()
}
fn default_metrics_port() -> u16 {
    8001
}
fn default_latency_buckets() -> Vec<f64> {
    DEFAULT_LATENCY_BUCKETS.to_vec()
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_metrics_host(),
            port: default_metrics_port(),
            latency_buckets: default_latency_buckets(),
        }
    }
}

impl MetricsConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Location and shape of the exported model artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_model_file")]
    pub model_file: String,

    #[serde(default = "default_scaler_file")]
    pub scaler_file: String,

    #[serde(default = "default_features_file")]
    pub features_file: String,

    #[serde(default = "default_expected_features")]
    pub expected_features: usize,
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("model")
}
fn default_model_file() -> String {
    "model.json".to_string()
}
fn default_scaler_file() -> String {
    "scaler.json".to_string()
}
fn default_features_file() -> String {
    "feature_names.json".to_string()
}
fn default_expected_features() -> usize {
    30
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dir: default_model_dir(),
            model_file: default_model_file(),
            scaler_file: default_scaler_file(),
            features_file: default_features_file(),
            expected_features: default_expected_features(),
        }
    }
}

/// Deployment identity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Version tag reported by health and `app_info` ("stable", "canary", ...)
    #[serde(default)]
    pub version: VersionTag,
}

/// Fault policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_fault_threshold")]
    pub fault_threshold: u32,
}

fn default_fault_threshold() -> u32 {
    DEFAULT_FAULT_THRESHOLD
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            fault_threshold: DEFAULT_FAULT_THRESHOLD,
        }
    }
}

/// Builder for [`AppConfig`]
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    server_builder: ServerConfigBuilder,
    metrics: MetricsConfig,
    model: ModelConfig,
    deployment: DeploymentConfig,
    health: HealthConfig,
}

impl AppConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: AppConfig) -> Self {
        Self {
            server_builder: config.server.to_builder(),
            metrics: config.metrics,
            model: config.model,
            deployment: config.deployment,
            health: config.health,
        }
    }

    /// Access server builder for chaining
    pub fn server(mut self, f: impl FnOnce(ServerConfigBuilder) -> ServerConfigBuilder) -> Self {
        self.server_builder = f(self.server_builder);
        self
    }

    pub fn metrics_enabled(mut self, enabled: bool) -> Self {
        self.metrics.enabled = enabled;
        self
    }

    pub fn metrics_port(mut self, port: u16) -> Self {
        self.metrics.port = port;
        self
    }

    pub fn model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model.dir = dir.into();
        self
    }

    pub fn expected_features(mut self, n: usize) -> Self {
        self.model.expected_features = n;
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.deployment.version = VersionTag::new(version);
        self
    }

    pub fn fault_threshold(mut self, threshold: u32) -> Self {
        self.health.fault_threshold = threshold;
        self
    }

    /// Load flat environment overrides
    pub fn from_env(self) -> Self {
        self.from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] over an arbitrary variable source
    pub fn from_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        self.server_builder = self.server_builder.from_lookup(&lookup);

        if let Some(port) = lookup("SVMSERVE_METRICS_PORT").and_then(|p| p.parse().ok()) {
            self.metrics.port = port;
        }
        if let Some(enabled) = lookup("SVMSERVE_METRICS_ENABLED") {
            self.metrics.enabled = enabled.to_lowercase() != "false";
        }
        if let Some(dir) = lookup("SVMSERVE_MODEL_DIR").or_else(|| lookup("MODEL_DIR")) {
            self.model.dir = PathBuf::from(dir);
        }
        if let Some(version) = lookup("SVMSERVE_VERSION").or_else(|| lookup("VERSION")) {
            self.deployment.version = VersionTag::new(version);
        }
        if let Some(threshold) = lookup("SVMSERVE_FAULT_THRESHOLD").and_then(|t| t.parse().ok()) {
            self.health.fault_threshold = threshold;
        }

        self
    }

    pub fn build(self) -> AppConfig {
        AppConfig {
            server: self.server_builder.build(),
            metrics: self.metrics,
            model: self.model,
            deployment: self.deployment,
            health: self.health,
        }
    }
}

impl AppConfig {
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::new()
    }

    /// Load defaults, an optional file and `SVMSERVE__*` environment variables,
    /// then apply flat environment overrides.
    pub fn load(config_file: Option<&Path>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings = builder
            .add_source(Environment::with_prefix("SVMSERVE").separator("__"))
            .build()?;
        let config: AppConfig = settings.try_deserialize()?;

        Ok(AppConfigBuilder::from_config(config).from_env().build())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Reject configurations that cannot start
    pub fn validate(&self) -> Result<()> {
        if self.metrics.enabled && self.metrics.port == self.server.port && self.metrics.port != 0 {
            return Err(Error::Config(format!(
                "metrics port {} collides with api port",
                self.metrics.port
            )));
        }
        if self.deployment.version.as_str().trim().is_empty() {
            return Err(Error::Config("deployment version must not be empty".to_string()));
        }
        if self.health.fault_threshold == 0 {
            return Err(Error::Config("fault_threshold must be at least 1".to_string()));
        }
        if self.model.expected_features == 0 {
            return Err(Error::Config("expected_features must be at least 1".to_string()));
        }
        let buckets = &self.metrics.latency_buckets;
        if buckets.is_empty() || buckets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::Config(
                "latency_buckets must be non-empty and strictly increasing".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.metrics.port, 8001);
        assert_eq!(config.model.dir, PathBuf::from("model"));
        assert_eq!(config.model.expected_features, 30);
        assert_eq!(config.deployment.version.as_str(), "unknown");
        assert_eq!(config.health.fault_threshold, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_flat_env_overrides() {
        let config = AppConfigBuilder::new()
            .from_lookup(lookup(&[
                ("VERSION", "canary"),
                ("MODEL_DIR", "/srv/model"),
                ("SVMSERVE_METRICS_PORT", "9101"),
                ("SVMSERVE_PORT", "9100"),
            ]))
            .build();
        assert_eq!(config.deployment.version.as_str(), "canary");
        assert_eq!(config.model.dir, PathBuf::from("/srv/model"));
        assert_eq!(config.metrics.port, 9101);
        assert_eq!(config.server.port, 9100);
    }

    #[test]
    fn test_prefixed_env_wins_over_plain() {
        let config = AppConfigBuilder::new()
            .from_lookup(lookup(&[("VERSION", "canary"), ("SVMSERVE_VERSION", "stable")]))
            .build();
        assert_eq!(config.deployment.version.as_str(), "stable");
    }

    #[test]
    fn test_builder_overrides() {
        let config = AppConfig::builder()
            .server(|s| s.port(18000))
            .metrics_port(18001)
            .version("canary")
            .fault_threshold(2)
            .build();
        assert_eq!(config.server.port, 18000);
        assert_eq!(config.metrics.port, 18001);
        assert_eq!(config.health.fault_threshold, 2);
    }

    #[test]
    fn test_validate_rejects_port_collision() {
        let config = AppConfig::builder().metrics_port(8000).build();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = AppConfig::builder().metrics_port(8000).metrics_enabled(false).build();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(AppConfig::builder().version("  ").build().validate().is_err());
        assert!(AppConfig::builder().fault_threshold(0).build().validate().is_err());
        assert!(AppConfig::builder().expected_features(0).build().validate().is_err());

        let mut config = AppConfig::default();
        config.metrics.latency_buckets = vec![0.1, 0.1];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AppConfig::builder().version("canary").build();
        let text = config.to_toml().unwrap();
        assert!(text.contains("version = \"canary\""));
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}

//! HTTP listener configuration with builder pattern
//!
//! Covers the API listener only: network settings, request timeout, runtime
//! worker count and CORS. The metrics listener lives in [`super::MetricsConfig`].

use serde::{Deserialize, Serialize};

/// CORS configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Enable CORS middleware
    #[serde(default = "default_cors_enabled")]
    pub enabled: bool,

    /// Allowed origins (use ["*"] for all origins)
    #[serde(default = "default_cors_origins")]
    pub allowed_origins: Vec<String>,

    /// Max age for preflight cache (in seconds)
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

fn default_cors_enabled() -> bool {
    true
}
fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}
fn default_cors_max_age() -> u64 {
    3600
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: default_cors_enabled(),
            allowed_origins: default_cors_origins(),
            max_age: default_cors_max_age(),
        }
    }
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// API listener configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Tokio worker threads; the CPU count when unset
    #[serde(default)]
    pub worker_threads: Option<usize>,

    #[serde(default)]
    pub cors: CorsConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
            worker_threads: None,
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::new()
    }

    pub fn to_builder(self) -> ServerConfigBuilder {
        ServerConfigBuilder::from_config(self)
    }

    /// `host:port` for the API listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Effective worker count for the runtime
    pub fn effective_worker_threads(&self) -> usize {
        self.worker_threads
            .filter(|n| *n > 0)
            .unwrap_or_else(num_cpus::get)
    }
}

/// Builder for ServerConfig with chainable methods
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    pub fn from_config(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn request_timeout_secs(mut self, timeout: u64) -> Self {
        self.config.request_timeout_secs = timeout;
        self
    }

    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.config.worker_threads = Some(threads);
        self
    }

    pub fn cors_enabled(mut self, enabled: bool) -> Self {
        self.config.cors.enabled = enabled;
        self
    }

    /// Load values from environment variables (merges with current config)
    pub fn from_env(self) -> Self {
        self.from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] over an arbitrary variable source
    pub fn from_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(host) = lookup("SVMSERVE_HOST") {
            self.config.host = host;
        }
        if let Some(port) = lookup("SVMSERVE_PORT").and_then(|p| p.parse().ok()) {
            self.config.port = port;
        }
        if let Some(timeout) = lookup("SVMSERVE_REQUEST_TIMEOUT_SECS").and_then(|t| t.parse().ok()) {
            self.config.request_timeout_secs = timeout;
        }
        if let Some(threads) = lookup("SVMSERVE_WORKER_THREADS").and_then(|t| t.parse().ok()) {
            self.config.worker_threads = Some(threads);
        }

        // CORS
        if let Some(enabled) = lookup("SVMSERVE_CORS_ENABLED") {
            self.config.cors.enabled = enabled.to_lowercase() != "false";
        }
        if let Some(origins) = lookup("SVMSERVE_CORS_ORIGINS") {
            self.config.cors.allowed_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self
    }

    pub fn build(self) -> ServerConfig {
        self.config
    }
}

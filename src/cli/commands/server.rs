//! Serve command arguments
//!
//! Configuration logic is in crate::config; these flags are the highest
//! priority layer on top of it.

use crate::config::AppConfigBuilder;
use clap::Args;
use serde::Deserialize;
use std::path::PathBuf;

/// CLI overrides for the listeners and deployment identity
#[derive(Debug, Default, Deserialize, Args)]
pub struct ServerCliArgs {
    /// API listener host address
    #[arg(long)]
    pub host: Option<String>,

    /// API listener port
    #[arg(long)]
    pub port: Option<u16>,

    /// Metrics listener port
    #[arg(long)]
    pub metrics_port: Option<u16>,

    /// Disable the metrics listener
    #[arg(long)]
    #[serde(default)]
    pub no_metrics: bool,

    /// Directory holding model.json, scaler.json and feature_names.json
    #[arg(long)]
    pub model_dir: Option<PathBuf>,

    /// Version tag reported by /health (e.g. stable, canary)
    #[arg(long = "version-tag")]
    pub version_tag: Option<String>,

    /// Tokio worker threads
    #[arg(long)]
    pub worker_threads: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,
}

impl ServerCliArgs {
    /// Merge these CLI args into an AppConfigBuilder
    pub fn apply_to_builder(&self, builder: AppConfigBuilder) -> AppConfigBuilder {
        let mut builder = builder;

        if let Some(ref host) = self.host {
            builder = builder.server(|s| s.host(host.clone()));
        }
        if let Some(port) = self.port {
            builder = builder.server(|s| s.port(port));
        }
        if let Some(threads) = self.worker_threads {
            builder = builder.server(|s| s.worker_threads(threads));
        }
        if let Some(timeout) = self.request_timeout_secs {
            builder = builder.server(|s| s.request_timeout_secs(timeout));
        }
        if let Some(port) = self.metrics_port {
            builder = builder.metrics_port(port);
        }
        if self.no_metrics {
            builder = builder.metrics_enabled(false);
        }
        if let Some(ref dir) = self.model_dir {
            builder = builder.model_dir(dir.clone());
        }
        if let Some(ref version) = self.version_tag {
            builder = builder.version(version.clone());
        }

        builder
    }
}

/// Run the prediction service
#[derive(Debug, Args)]
pub struct ServeCommand {
    #[command(flatten)]
    pub server: ServerCliArgs,
}

//! Offline model commands

use crate::config::AppConfigBuilder;
use clap::{ArgGroup, Args};
use std::path::PathBuf;

/// Load and validate the model bundle, then print a summary
#[derive(Debug, Args)]
pub struct InspectCommand {
    /// Directory holding the model artifacts
    #[arg(long)]
    pub model_dir: Option<PathBuf>,
}

/// Run one prediction without starting the server
#[derive(Debug, Args)]
#[command(group(ArgGroup::new("source").required(true).args(["features", "input"])))]
pub struct PredictCommand {
    /// Directory holding the model artifacts
    #[arg(long)]
    pub model_dir: Option<PathBuf>,

    /// Comma separated feature values
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub features: Option<Vec<f64>>,

    /// JSON file with either a bare array or a `{"features": [...]}` object
    #[arg(long)]
    pub input: Option<PathBuf>,
}

fn apply_model_dir(dir: &Option<PathBuf>, builder: AppConfigBuilder) -> AppConfigBuilder {
    match dir {
        Some(dir) => builder.model_dir(dir.clone()),
        None => builder,
    }
}

impl InspectCommand {
    pub fn apply_to_builder(&self, builder: AppConfigBuilder) -> AppConfigBuilder {
        apply_model_dir(&self.model_dir, builder)
    }
}

impl PredictCommand {
    pub fn apply_to_builder(&self, builder: AppConfigBuilder) -> AppConfigBuilder {
        apply_model_dir(&self.model_dir, builder)
    }
}

use clap::{Args, ValueEnum};
use serde::Deserialize;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration that can be set via CLI or env vars
#[derive(Debug, Clone, Default, Args, Deserialize)]
pub struct LoggingConfig {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    #[serde(skip)]
    pub verbose: u8,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log-level", env = "SVMSERVE_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Log filter directives, overrides the level
    #[arg(long = "log-filter", env = "SVMSERVE_LOG_FILTER", global = true)]
    pub log_filter: Option<String>,

    /// Log output format
    #[arg(long = "log-format", value_enum, default_value = "text", env = "SVMSERVE_LOG_FORMAT", global = true)]
    #[serde(default)]
    pub log_format: LogFormat,
}

impl LoggingConfig {
    pub fn get_effective_level(&self) -> &str {
        match (self.verbose, self.log_level.as_deref()) {
            (v, _) if v >= 2 => "trace", // -vv flag
            (1, _) => "debug",           // -v flag
            (0, Some(level)) => level,   // Configured level
            _ => "info",                 // Default
        }
    }

    /// Filter directives for `EnvFilter`.
    ///
    /// Precedence: `--log-filter`, then `RUST_LOG` when no level was requested
    /// explicitly, then the effective level applied to this crate and the HTTP
    /// tracing layer.
    pub fn filter_directives(&self, rust_log: Option<String>) -> String {
        if let Some(filter) = &self.log_filter {
            return filter.clone();
        }
        if self.verbose == 0 && self.log_level.is_none() {
            if let Some(env) = rust_log.filter(|s| !s.trim().is_empty()) {
                return env;
            }
        }
        let level = self.get_effective_level();
        format!("svmserve={level},svmserve_core={level},tower_http={level}")
    }
}

/// Output format for `svmserve config`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    #[default]
    Toml,
    Json,
    Yaml,
}

/// Print the effective configuration
#[derive(Debug, Args)]
pub struct ConfigCommand {
    /// Output format
    #[arg(long, value_enum, default_value = "toml")]
    pub format: ConfigFormat,
}

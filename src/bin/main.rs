//! svmserve binary.
//!
//! Entry point for the SVM prediction service: parses the command line,
//! initializes logging, merges configuration and dispatches to a handler.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use svmserve_core::{
    cli::{
        commands::Commands,
        handle_config, handle_inspect, handle_predict, handle_serve, LogFormat, LoggingConfig,
    },
    AppConfig, AppConfigBuilder,
};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt::writer::BoxMakeWriter, EnvFilter};

#[derive(Parser)]
#[command(
    name = "svmserve",
    version,
    about = "Prediction service for a pre-trained SVM classifier",
    long_about = None
)]
struct Cli {
    /// Path to configuration file (toml, json or yaml)
    #[arg(long, global = true, env = "SVMSERVE_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

/// Initialize tracing. The returned guard must live until exit; dropping it
/// stops the background file writer.
fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::builder()
        .parse_lossy(logging.filter_directives(std::env::var("RUST_LOG").ok()));

    // File logging is enabled via environment variable, rotated daily
    let log_dir = std::env::var("SVMSERVE_LOG_DIR").ok();
    let (writer, guard) = match &log_dir {
        Some(dir) => {
            let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "svmserve.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(log_dir.is_none())
        .with_writer(writer);

    match logging.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.with_file(true).with_line_number(true).init(),
    }

    if let Some(dir) = &log_dir {
        info!("File logging enabled to {}/svmserve.log", dir);
    }
    guard
}

/// Load AppConfig from defaults, optional file and environment
fn load_config(path: Option<&Path>) -> Result<AppConfigBuilder> {
    if let Some(p) = path {
        info!("Loading config from: {}", p.display());
    }
    let config = AppConfig::load(path).with_context(|| match path {
        Some(p) => format!("Failed to load config from {}", p.display()),
        None => "Failed to load config from environment".to_string(),
    })?;
    Ok(AppConfigBuilder::from_config(config))
}

fn finalize(builder: AppConfigBuilder) -> Result<AppConfig> {
    let config = builder.build();
    config
        .validate()
        .context("Configuration validation failed")?;
    Ok(config)
}

/// Execute an async handler on a multi-threaded runtime
fn with_runtime<F, Fut>(worker_threads: usize, handler: F) -> Result<()>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<()>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .thread_name("svmserve-worker")
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;
    runtime.block_on(handler())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive for the entire program lifetime
    let _log_guard = init_logging(&cli.logging);

    let builder = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve(cmd) => {
            let config = finalize(cmd.server.apply_to_builder(builder))?;
            info!("svmserve v{} starting up", env!("CARGO_PKG_VERSION"));
            let worker_threads = config.server.effective_worker_threads();
            with_runtime(worker_threads, move || handle_serve(config))
        }
        Commands::Inspect(cmd) => {
            let config = finalize(cmd.apply_to_builder(builder))?;
            handle_inspect(&config)
        }
        Commands::Predict(cmd) => {
            let config = finalize(cmd.apply_to_builder(builder))?;
            handle_predict(&config, &cmd)
        }
        Commands::Config(cmd) => {
            let config = finalize(builder)?;
            handle_config(&config, cmd.format)
        }
    }
}

//! Command-line interface module.
//!
//! Subcommands:
//! - `serve`: run the API and metrics listeners
//! - `inspect`: validate model artifacts
//! - `predict`: one offline prediction
//! - `config`: print the merged configuration

pub mod commands;
pub mod handlers;

pub use commands::{Commands, LogFormat, LoggingConfig};
pub use handlers::{handle_config, handle_inspect, handle_predict, handle_serve};

pub mod config;
pub mod model;
pub mod server;

pub use config::{ConfigCommand, ConfigFormat, LogFormat, LoggingConfig};
pub use model::{InspectCommand, PredictCommand};
pub use server::{ServeCommand, ServerCliArgs};

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API and metrics listeners
    Serve(ServeCommand),

    /// Validate the model artifacts and print a summary
    Inspect(InspectCommand),

    /// Run a single prediction offline
    Predict(PredictCommand),

    /// Print the effective configuration
    Config(ConfigCommand),
}

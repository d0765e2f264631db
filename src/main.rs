//! `pr-pilot` service entrypoint.

use std::io::{self, Write};
use std::process::ExitCode;

use ortho_config::OrthoConfig;
use pr_pilot::app::{self, AppError};
use pr_pilot::logging::{self, LogFormat};
use pr_pilot::PilotConfig;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(error = %error, "pr-pilot stopped");
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), AppError> {
    let config = load_config()?;
    logging::init(LogFormat::from_flag(config.log_json));
    app::run(&config).await
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`AppError::ConfigLoad`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<PilotConfig, AppError> {
    PilotConfig::load().map_err(|error| AppError::ConfigLoad {
        message: error.to_string(),
    })
}

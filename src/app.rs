//! Wiring of configuration into a running service.

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{ConfigError, PilotConfig};
use crate::github::{GitHubError, OAuthTokenExchange, OctocrabGitHubGateway};
use crate::persistence::{
    PersistenceError, SchemaVersion, SqliteMirrorStore, TokenCipher, migrate_database,
};
use crate::server::{self, AppState};
use crate::sync::SyncService;
use crate::telemetry::{TelemetrySink, TracingTelemetrySink};

/// Errors that stop the service from starting or keep it from running.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required option is missing.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Loading configuration layers failed.
    #[error("failed to load configuration: {message}")]
    ConfigLoad {
        /// ortho-config detail.
        message: String,
    },

    /// Opening, migrating, or keying the database failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// A GitHub base URL is invalid.
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    /// Binding or serving failed.
    #[error("server I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Applies pending migrations to the configured database.
///
/// # Errors
///
/// Returns [`AppError`] when the URL is missing or migration fails.
pub fn migrate(
    config: &PilotConfig,
    telemetry: &dyn TelemetrySink,
) -> Result<SchemaVersion, AppError> {
    let database_url = config.require_database_url()?;
    Ok(migrate_database(database_url, telemetry)?)
}

/// Builds the router state from configuration.
///
/// # Errors
///
/// Returns [`AppError`] when a required option is missing, the token key is
/// invalid, or a GitHub base URL does not parse.
pub fn build_state(
    config: &PilotConfig,
    telemetry: Arc<dyn TelemetrySink>,
) -> Result<AppState, AppError> {
    let cipher = TokenCipher::from_key(config.require_token_key()?)?;
    let store = SqliteMirrorStore::new(config.require_database_url()?, cipher)?;
    let gateway = OctocrabGitHubGateway::new(&config.github_api_base)?;
    let exchange =
        OAuthTokenExchange::new(&config.github_oauth_base, config.require_oauth_credentials()?)?;

    let service = SyncService::new(
        Arc::new(gateway),
        Arc::new(exchange),
        Arc::new(store),
        telemetry,
    );
    Ok(AppState::new(service, config.authorize_target()?))
}

/// Runs the service described by `config`.
///
/// With `migrate_db` set, migrations are applied and the call returns.
/// Otherwise pending migrations are applied and the server runs until
/// Ctrl-C.
///
/// # Errors
///
/// Returns [`AppError`] for any startup or serving failure.
pub async fn run(config: &PilotConfig) -> Result<(), AppError> {
    let telemetry: Arc<dyn TelemetrySink> = Arc::new(TracingTelemetrySink);

    let schema_version = migrate(config, telemetry.as_ref())?;
    if config.migrate_db {
        tracing::info!(schema_version = schema_version.as_str(), "migrations applied; exiting");
        return Ok(());
    }

    let state = build_state(config, telemetry)?;
    let listener = TcpListener::bind(&config.bind_address).await?;
    server::serve(listener, server::router(state)).await?;
    Ok(())
}

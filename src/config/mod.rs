//! Service configuration loaded from CLI, environment, and files.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.pr-pilot.toml` in the current directory,
//!    home directory, or XDG config directory
//! 3. **Environment variables** – `PR_PILOT_*`
//! 4. **Command-line arguments** – `--database-url`, `--token-key`, ...
//!
//! # Configuration File
//!
//! ```toml
//! bind_address = "0.0.0.0:8080"
//! public_origin = "https://pilot.example"
//! github_client_id = "Iv1.0123456789abcdef"
//! github_client_secret = "..."
//! database_url = "pr-pilot.sqlite"
//! token_key = "AGE-SECRET-KEY-1..."
//! ```

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::github::{AuthorizeTarget, OAuthCredentials};

/// A required option was not supplied by any layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No OAuth client id.
    #[error("GitHub client id is required (use --github-client-id or PR_PILOT_GITHUB_CLIENT_ID)")]
    MissingClientId,

    /// No OAuth client secret.
    #[error(
        "GitHub client secret is required (use --github-client-secret or PR_PILOT_GITHUB_CLIENT_SECRET)"
    )]
    MissingClientSecret,

    /// No database URL.
    #[error("database URL is required (use --database-url or PR_PILOT_DATABASE_URL)")]
    MissingDatabaseUrl,

    /// No token encryption key.
    #[error("token encryption key is required (use --token-key or PR_PILOT_TOKEN_KEY)")]
    MissingTokenKey,
}

/// Service configuration supporting CLI, environment, and file sources.
///
/// # Example
///
/// ```no_run
/// use ortho_config::OrthoConfig;
/// use pr_pilot::PilotConfig;
///
/// let config = PilotConfig::load().expect("failed to load configuration");
/// let database_url = config.require_database_url().expect("database URL required");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "PR_PILOT",
    discovery(
        dotfile_name = ".pr-pilot.toml",
        config_file_name = "pr-pilot.toml",
        app_name = "pr-pilot"
    )
)]
pub struct PilotConfig {
    /// Socket address the HTTP server binds.
    ///
    /// Can be provided via:
    /// - CLI: `--bind-address <ADDR>` or `-b <ADDR>`
    /// - Environment: `PR_PILOT_BIND_ADDRESS`
    /// - Config file: `bind_address = "..."`
    #[ortho_config(cli_short = 'b')]
    pub bind_address: String,

    /// Origin the browser application is served from; the OAuth callback is
    /// `<public_origin>/github-callback`.
    #[ortho_config()]
    pub public_origin: String,

    /// OAuth application client id.
    #[ortho_config()]
    pub github_client_id: Option<String>,

    /// OAuth application client secret. Never leaves the server.
    #[ortho_config()]
    pub github_client_secret: Option<String>,

    /// GitHub REST API base URL.
    #[ortho_config()]
    pub github_api_base: String,

    /// GitHub web origin used for OAuth endpoints.
    #[ortho_config()]
    pub github_oauth_base: String,

    /// `SQLite` database path.
    ///
    /// Can be provided via:
    /// - CLI: `--database-url <PATH>`
    /// - Environment: `PR_PILOT_DATABASE_URL`
    /// - Config file: `database_url = "..."`
    #[ortho_config()]
    pub database_url: Option<String>,

    /// age X25519 identity (`AGE-SECRET-KEY-1...`) sealing stored tokens.
    #[ortho_config()]
    pub token_key: Option<String>,

    /// Applies pending migrations and exits.
    ///
    /// Can be provided via:
    /// - CLI: `--migrate-db`
    /// - Config file: `migrate_db = true`
    #[ortho_config()]
    pub migrate_db: bool,

    /// Emits logs as JSON lines instead of the human-readable format.
    ///
    /// Note: boolean values are not read from the environment by
    /// `ortho_config`; use the CLI flag or the config file.
    #[ortho_config()]
    pub log_json: bool,
}

/// Default bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
/// Default public origin.
pub const DEFAULT_PUBLIC_ORIGIN: &str = "http://localhost:8080";
/// Default GitHub REST API base.
pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
/// Default GitHub web origin.
pub const DEFAULT_GITHUB_OAUTH_BASE: &str = "https://github.com";

impl Default for PilotConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_owned(),
            public_origin: DEFAULT_PUBLIC_ORIGIN.to_owned(),
            github_client_id: None,
            github_client_secret: None,
            github_api_base: DEFAULT_GITHUB_API_BASE.to_owned(),
            github_oauth_base: DEFAULT_GITHUB_OAUTH_BASE.to_owned(),
            database_url: None,
            token_key: None,
            migrate_db: false,
            log_json: false,
        }
    }
}

fn present(value: Option<&String>) -> Option<&str> {
    value
        .map(String::as_str)
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
}

impl PilotConfig {
    /// Returns the database URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDatabaseUrl`] when unset or blank.
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        present(self.database_url.as_ref()).ok_or(ConfigError::MissingDatabaseUrl)
    }

    /// Returns the token encryption key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingTokenKey`] when unset or blank.
    pub fn require_token_key(&self) -> Result<&str, ConfigError> {
        present(self.token_key.as_ref()).ok_or(ConfigError::MissingTokenKey)
    }

    /// Returns the OAuth client id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingClientId`] when unset or blank.
    pub fn require_client_id(&self) -> Result<&str, ConfigError> {
        present(self.github_client_id.as_ref()).ok_or(ConfigError::MissingClientId)
    }

    /// Returns the OAuth client credentials.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] naming whichever half is missing.
    pub fn require_oauth_credentials(&self) -> Result<OAuthCredentials, ConfigError> {
        let client_id = self.require_client_id()?;
        let client_secret = present(self.github_client_secret.as_ref())
            .ok_or(ConfigError::MissingClientSecret)?;
        Ok(OAuthCredentials::new(client_id, client_secret))
    }

    /// Target of the browser-facing authorize redirect.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingClientId`] when no client id is set.
    pub fn authorize_target(&self) -> Result<AuthorizeTarget, ConfigError> {
        Ok(AuthorizeTarget {
            oauth_base: self.github_oauth_base.clone(),
            client_id: self.require_client_id()?.to_owned(),
            public_origin: self.public_origin.clone(),
        })
    }
}

#[cfg(test)]
mod tests;

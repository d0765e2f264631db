//! Error types exposed by the GitHub gateway layer.

use thiserror::Error;

/// Errors surfaced while validating input or communicating with GitHub.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GitHubError {
    /// The bearer token was missing or blank.
    #[error("access token is required")]
    MissingToken,

    /// The authorization code was missing or blank.
    #[error("authorization code is required")]
    MissingCode,

    /// The repository full name is not `owner/name`.
    #[error("repository name must match owner/name: {0}")]
    InvalidRepositoryName(String),

    /// The pull request number is not a positive integer.
    #[error("pull request number must be a positive integer")]
    InvalidPullRequestNumber,

    /// A configured base URL could not be parsed.
    #[error("GitHub URL is invalid: {0}")]
    InvalidUrl(String),

    /// GitHub's token endpoint answered with an error payload.
    #[error("{message}")]
    TokenExchange {
        /// `error_description` from GitHub, or a generic fallback.
        message: String,
    },

    /// The token was rejected by GitHub.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// GitHub returned a non-authentication API error.
    #[error("GitHub API error: {message}")]
    Api {
        /// Response detail from GitHub describing the failure.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },
}

impl GitHubError {
    /// Returns true when GitHub itself answered with a non-success status.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::Api { .. })
    }
}

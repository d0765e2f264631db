//! Octocrab client construction helpers for gateway implementations.

use http::Uri;
use octocrab::Octocrab;

use crate::github::error::GitHubError;
use crate::github::locator::AccessToken;

use super::error_mapping::map_octocrab_error;

/// Parses and validates an API base URL.
///
/// # Errors
///
/// Returns `GitHubError::InvalidUrl` when the base URI cannot be parsed.
pub(super) fn parse_base_uri(api_base: &str) -> Result<Uri, GitHubError> {
    api_base
        .trim_end_matches('/')
        .parse::<Uri>()
        .map_err(|error| GitHubError::InvalidUrl(error.to_string()))
}

/// Builds an Octocrab client authorised with the given bearer token.
///
/// # Errors
///
/// Returns `GitHubError::Api` when Octocrab fails to construct a client.
pub(super) fn build_octocrab_client(
    token: &AccessToken,
    base_uri: Uri,
) -> Result<Octocrab, GitHubError> {
    Octocrab::builder()
        .personal_token(token.as_ref())
        .base_uri(base_uri)
        .map_err(|error| GitHubError::Api {
            message: format!("build client failed: {error}"),
        })?
        .build()
        .map_err(|error| map_octocrab_error("build client", &error))
}

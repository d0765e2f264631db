//! Client-facing OAuth authorize URL.

use url::Url;

use super::error::GitHubError;

/// Scope requested from GitHub: private repositories plus profile data.
pub const OAUTH_SCOPE: &str = "repo user";

/// Path on the application origin that receives GitHub's redirect.
pub const CALLBACK_PATH: &str = "/github-callback";

/// Builds the URL a browser is sent to in order to start the OAuth flow.
///
/// GitHub redirects back to `<origin>/github-callback` with either `code` or
/// `error` in the query string.
///
/// # Errors
///
/// Returns [`GitHubError::InvalidUrl`] when `oauth_base` cannot be parsed.
pub fn authorize_url(oauth_base: &str, client_id: &str, origin: &str) -> Result<Url, GitHubError> {
    let mut url = Url::parse(&format!(
        "{}/login/oauth/authorize",
        oauth_base.trim_end_matches('/')
    ))
    .map_err(|error| GitHubError::InvalidUrl(error.to_string()))?;

    let redirect_uri = format!("{}{CALLBACK_PATH}", origin.trim_end_matches('/'));
    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", &redirect_uri)
        .append_pair("scope", OAUTH_SCOPE);

    Ok(url)
}

/// The public pieces needed to build the authorize URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeTarget {
    /// GitHub web origin, e.g. `https://github.com`.
    pub oauth_base: String,
    /// Public OAuth client id.
    pub client_id: String,
    /// Origin the callback page is served from.
    pub public_origin: String,
}

impl AuthorizeTarget {
    /// Builds the authorize URL for this target.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::InvalidUrl`] when `oauth_base` cannot be parsed.
    pub fn url(&self) -> Result<Url, GitHubError> {
        authorize_url(&self.oauth_base, &self.client_id, &self.public_origin)
    }
}

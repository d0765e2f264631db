//! OAuth web-flow code exchange against GitHub's token endpoint.

use std::fmt;

use async_trait::async_trait;
use http::header::ACCEPT;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::github::error::GitHubError;
use crate::github::locator::{AccessToken, AuthorizationCode};

use super::TokenExchange;
use super::error_mapping::map_reqwest_error;

const TOKEN_PATH: &str = "login/oauth/access_token";
const EXCHANGE_FALLBACK_MESSAGE: &str = "Failed to exchange code for token";

/// Confidential OAuth application credentials, held server-side only.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    client_id: String,
    client_secret: String,
}

impl OAuthCredentials {
    /// Bundles the OAuth app's client id and secret.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// The public client id.
    #[must_use]
    pub const fn client_id(&self) -> &str {
        self.client_id.as_str()
    }
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

/// reqwest-backed token exchange.
#[derive(Debug, Clone)]
pub struct OAuthTokenExchange {
    http: Client,
    endpoint: Url,
    credentials: OAuthCredentials,
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl OAuthTokenExchange {
    /// Creates an exchange posting to `{oauth_base}/login/oauth/access_token`.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::InvalidUrl` when `oauth_base` cannot be parsed.
    pub fn new(oauth_base: &str, credentials: OAuthCredentials) -> Result<Self, GitHubError> {
        let endpoint = Url::parse(&format!(
            "{}/{TOKEN_PATH}",
            oauth_base.trim_end_matches('/')
        ))
        .map_err(|error| GitHubError::InvalidUrl(error.to_string()))?;

        Ok(Self {
            http: Client::new(),
            endpoint,
            credentials,
        })
    }
}

#[async_trait]
impl TokenExchange for OAuthTokenExchange {
    async fn exchange_code(&self, code: &AuthorizationCode) -> Result<AccessToken, GitHubError> {
        let payload = TokenRequest {
            client_id: self.credentials.client_id.as_str(),
            client_secret: self.credentials.client_secret.as_str(),
            code: code.value(),
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|error| map_reqwest_error("token exchange", &error))?;

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|error| map_reqwest_error("token exchange", &error))?;

        if let Some(error) = body.error {
            tracing::warn!(%error, "GitHub rejected the authorization code");
            return Err(GitHubError::TokenExchange {
                message: body
                    .error_description
                    .unwrap_or_else(|| EXCHANGE_FALLBACK_MESSAGE.to_owned()),
            });
        }

        body.access_token
            .and_then(|token| AccessToken::new(token).ok())
            .ok_or_else(|| GitHubError::TokenExchange {
                message: EXCHANGE_FALLBACK_MESSAGE.to_owned(),
            })
    }
}

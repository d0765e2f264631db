//! Gateways for talking to GitHub.
//!
//! The REST calls made on behalf of a user go through Octocrab; the OAuth
//! code exchange is a plain form post to `github.com` and goes through
//! reqwest. Both sit behind traits so the sync layer can be exercised with
//! mocks.

mod api;
mod client;
mod error_mapping;
mod oauth;

pub use api::OctocrabGitHubGateway;
pub use oauth::{OAuthCredentials, OAuthTokenExchange};

use async_trait::async_trait;

use crate::github::error::GitHubError;
use crate::github::locator::{
    AccessToken, AuthorizationCode, PullRequestNumber, RepositoryLocator,
};
use crate::github::models::{GitHubIdentity, PullRequestSnapshot, RepositorySnapshot};

/// Maximum items requested from a single GitHub listing call.
pub const PAGE_SIZE: u8 = 100;

/// Gateway for GitHub REST calls authorised by a user's bearer token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitHubGateway: Send + Sync {
    /// Fetch the account that owns `token`.
    async fn authenticated_user(&self, token: &AccessToken)
    -> Result<GitHubIdentity, GitHubError>;

    /// Fetch up to [`PAGE_SIZE`] repositories, most recently updated first.
    async fn repositories(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<RepositorySnapshot>, GitHubError>;

    /// Fetch up to [`PAGE_SIZE`] open pull requests for `repository`.
    async fn open_pull_requests(
        &self,
        token: &AccessToken,
        repository: &RepositoryLocator,
    ) -> Result<Vec<PullRequestSnapshot>, GitHubError>;

    /// Post an issue comment on a pull request and return GitHub's payload.
    async fn post_comment(
        &self,
        token: &AccessToken,
        repository: &RepositoryLocator,
        number: PullRequestNumber,
        body: &str,
    ) -> Result<serde_json::Value, GitHubError>;
}

/// Exchanges an OAuth authorization code for a bearer token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// Trade `code` for an access token.
    async fn exchange_code(&self, code: &AuthorizationCode) -> Result<AccessToken, GitHubError>;
}

//! GitHub OAuth and REST access.
//!
//! This module wraps Octocrab and reqwest to exchange OAuth codes, read the
//! authenticated user's repositories and open pull requests, and post issue
//! comments. Errors are mapped into [`GitHubError`] so callers can decide how
//! each failure surfaces without depending on client internals.

pub mod authorize;
pub mod error;
pub mod gateway;
pub mod locator;
pub mod models;

pub use authorize::{AuthorizeTarget, authorize_url};
pub use error::GitHubError;
pub use gateway::{
    GitHubGateway, OAuthCredentials, OAuthTokenExchange, OctocrabGitHubGateway, TokenExchange,
};
pub use locator::{AccessToken, AuthorizationCode, PullRequestNumber, RepositoryLocator};
pub use models::{GitHubIdentity, PullRequestSnapshot, RepositorySnapshot};

#[cfg(test)]
pub use gateway::{MockGitHubGateway, MockTokenExchange};

//! Octocrab implementation of the GitHub REST gateway.

use async_trait::async_trait;
use http::Uri;
use serde::Serialize;

use crate::github::error::GitHubError;
use crate::github::locator::{AccessToken, PullRequestNumber, RepositoryLocator};
use crate::github::models::{
    ApiPullRequest, ApiRepository, GitHubIdentity, PullRequestSnapshot, RepositorySnapshot,
};

use super::client::{build_octocrab_client, parse_base_uri};
use super::error_mapping::map_octocrab_error;
use super::{GitHubGateway, PAGE_SIZE};

/// Octocrab-backed gateway.
///
/// A fresh client is built per call because each call carries the caller's
/// own bearer token.
#[derive(Debug, Clone)]
pub struct OctocrabGitHubGateway {
    base_uri: Uri,
}

#[derive(Debug, Serialize)]
struct CommentPayload<'a> {
    body: &'a str,
}

impl OctocrabGitHubGateway {
    /// Creates a gateway targeting `api_base` (e.g. `https://api.github.com`).
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::InvalidUrl` when the base URI cannot be parsed.
    pub fn new(api_base: &str) -> Result<Self, GitHubError> {
        Ok(Self {
            base_uri: parse_base_uri(api_base)?,
        })
    }

    fn client_for(&self, token: &AccessToken) -> Result<octocrab::Octocrab, GitHubError> {
        build_octocrab_client(token, self.base_uri.clone())
    }
}

#[async_trait]
impl GitHubGateway for OctocrabGitHubGateway {
    async fn authenticated_user(
        &self,
        token: &AccessToken,
    ) -> Result<GitHubIdentity, GitHubError> {
        self.client_for(token)?
            .get::<GitHubIdentity, _, _>("/user", None::<&()>)
            .await
            .map_err(|error| map_octocrab_error("authenticated user", &error))
    }

    async fn repositories(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<RepositorySnapshot>, GitHubError> {
        let per_page = PAGE_SIZE.to_string();
        let query_params = [("per_page", per_page.as_str()), ("sort", "updated")];

        let repositories: Vec<ApiRepository> = self
            .client_for(token)?
            .get("/user/repos", Some(&query_params))
            .await
            .map_err(|error| map_octocrab_error("list repositories", &error))?;

        Ok(repositories
            .into_iter()
            .map(ApiRepository::into)
            .collect())
    }

    async fn open_pull_requests(
        &self,
        token: &AccessToken,
        repository: &RepositoryLocator,
    ) -> Result<Vec<PullRequestSnapshot>, GitHubError> {
        let per_page = PAGE_SIZE.to_string();
        let query_params = [("state", "open"), ("per_page", per_page.as_str())];

        let pull_requests: Vec<ApiPullRequest> = self
            .client_for(token)?
            .get(repository.pulls_path(), Some(&query_params))
            .await
            .map_err(|error| map_octocrab_error("list pulls", &error))?;

        Ok(pull_requests
            .into_iter()
            .map(ApiPullRequest::into)
            .collect())
    }

    async fn post_comment(
        &self,
        token: &AccessToken,
        repository: &RepositoryLocator,
        number: PullRequestNumber,
        body: &str,
    ) -> Result<serde_json::Value, GitHubError> {
        self.client_for(token)?
            .post(
                repository.issue_comments_path(number),
                Some(&CommentPayload { body }),
            )
            .await
            .map_err(|error| map_octocrab_error("post comment", &error))
    }
}

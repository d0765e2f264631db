//! Data models for GitHub identities, repositories, and pull requests.
//!
//! Types prefixed with `Api` are internal deserialisation targets that
//! convert into the public snapshot types handed to the sync layer.

use serde::{Deserialize, Serialize};

#[cfg(feature = "test-support")]
pub mod test_support;

/// The GitHub account that owns an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubIdentity {
    /// GitHub user id.
    pub id: i64,
    /// Login name.
    pub login: String,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
    /// Display name, when set.
    pub name: Option<String>,
    /// Public email, when visible to the token.
    pub email: Option<String>,
}

/// A repository as reported by `GET /user/repos`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositorySnapshot {
    /// GitHub repository id.
    pub id: i64,
    /// Short name.
    pub name: String,
    /// `owner/name`.
    pub full_name: String,
    /// Description text.
    pub description: Option<String>,
    /// Browser URL.
    pub html_url: String,
    /// HTTPS clone URL.
    pub clone_url: String,
    /// Default branch name.
    pub default_branch: Option<String>,
    /// Whether the repository is private.
    pub is_private: bool,
    /// Stargazer count.
    pub stars_count: i64,
    /// Fork count.
    pub forks_count: i64,
    /// Primary language.
    pub language: Option<String>,
}

/// An open pull request as reported by `GET /repos/{full_name}/pulls`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestSnapshot {
    /// GitHub pull request id (not the number).
    pub id: i64,
    /// Pull request number within the repository.
    pub number: i64,
    /// Title.
    pub title: String,
    /// Body text.
    pub body: Option<String>,
    /// State (always `open` for listed items).
    pub state: String,
    /// Browser URL.
    pub html_url: String,
    /// Head branch name.
    pub head_branch: String,
    /// Base branch name.
    pub base_branch: String,
    /// Author login.
    pub author_username: Option<String>,
    /// Author avatar URL.
    pub author_avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiRepository {
    pub(super) id: i64,
    pub(super) name: String,
    pub(super) full_name: String,
    pub(super) description: Option<String>,
    pub(super) html_url: String,
    #[serde(default)]
    pub(super) clone_url: Option<String>,
    pub(super) default_branch: Option<String>,
    #[serde(default)]
    pub(super) private: bool,
    #[serde(default)]
    pub(super) stargazers_count: i64,
    #[serde(default)]
    pub(super) forks_count: i64,
    pub(super) language: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiPullRequest {
    pub(super) id: i64,
    pub(super) number: i64,
    pub(super) title: String,
    pub(super) body: Option<String>,
    pub(super) state: String,
    pub(super) html_url: String,
    pub(super) head: ApiBranchRef,
    pub(super) base: ApiBranchRef,
    pub(super) user: Option<ApiUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiBranchRef {
    #[serde(rename = "ref")]
    pub(super) name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiUser {
    pub(super) login: Option<String>,
    pub(super) avatar_url: Option<String>,
}

impl From<ApiRepository> for RepositorySnapshot {
    fn from(value: ApiRepository) -> Self {
        Self {
            id: value.id,
            name: value.name,
            full_name: value.full_name,
            description: value.description,
            html_url: value.html_url,
            clone_url: value.clone_url.unwrap_or_default(),
            default_branch: value.default_branch,
            is_private: value.private,
            stars_count: value.stargazers_count,
            forks_count: value.forks_count,
            language: value.language,
        }
    }
}

impl From<ApiPullRequest> for PullRequestSnapshot {
    fn from(value: ApiPullRequest) -> Self {
        let (author_username, author_avatar_url) = value
            .user
            .map_or((None, None), |user| (user.login, user.avatar_url));

        Self {
            id: value.id,
            number: value.number,
            title: value.title,
            body: value.body,
            state: value.state,
            html_url: value.html_url,
            head_branch: value.head.name,
            base_branch: value.base.name,
            author_username,
            author_avatar_url,
        }
    }
}

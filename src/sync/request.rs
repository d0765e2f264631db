//! Wire shapes of the dispatcher and the action switch.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::github::{
    AccessToken, AuthorizationCode, GitHubIdentity, PullRequestNumber, RepositoryLocator,
};
use crate::persistence::{PullRequestRow, RepositoryRow};
use crate::session::{Session, UserId};

use super::service::SyncService;
use super::{
    MISSING_COMMENT_PARAMETERS, MISSING_EXCHANGE_PARAMETERS, MISSING_PULL_REQUEST_PARAMETERS,
    MISSING_REPOSITORY_PARAMETERS, MISSING_USER_ID, SyncError,
};

/// The actions the dispatcher understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Trade an OAuth code for a token and connect the profile.
    ExchangeCode,
    /// Mirror the token owner's repositories.
    FetchRepositories,
    /// Mirror a repository's open pull requests.
    FetchPullRequests,
    /// Post a comment on a pull request.
    CommentOnPr,
}

impl FromStr for Action {
    type Err = SyncError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "exchange_code" => Ok(Self::ExchangeCode),
            "fetch_repositories" => Ok(Self::FetchRepositories),
            "fetch_pull_requests" => Ok(Self::FetchPullRequests),
            "comment_on_pr" => Ok(Self::CommentOnPr),
            _ => Err(SyncError::InvalidAction),
        }
    }
}

/// Request body: the action plus the union of every action's fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRequest {
    /// Action discriminator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// OAuth authorization code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Local user id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// GitHub bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Repository `owner/name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_full_name: Option<String>,
    /// Pull request number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_number: Option<i64>,
    /// Comment body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Action-specific part of a successful response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DispatchPayload {
    /// `exchange_code` result.
    Connected {
        /// The connected GitHub account.
        user: GitHubIdentity,
        /// The issued bearer token.
        access_token: String,
    },
    /// `fetch_repositories` result.
    Repositories {
        /// Repositories GitHub returned.
        count: usize,
        /// Mirrored repositories after the sync.
        repositories: Vec<RepositoryRow>,
    },
    /// `fetch_pull_requests` result.
    PullRequests {
        /// Open pull requests GitHub returned.
        count: usize,
        /// Mirrored open pull requests after the sync.
        pull_requests: Vec<PullRequestRow>,
    },
    /// `comment_on_pr` result.
    Comment {
        /// GitHub's created comment payload.
        comment: Value,
    },
}

/// Successful dispatcher response, always carrying `success: true`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchResponse {
    success: bool,
    #[serde(flatten)]
    payload: DispatchPayload,
}

impl DispatchResponse {
    fn ok(payload: DispatchPayload) -> Self {
        Self {
            success: true,
            payload,
        }
    }

    /// The action-specific payload.
    #[must_use]
    pub const fn payload(&self) -> &DispatchPayload {
        &self.payload
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|trimmed| !trimmed.is_empty())
}

fn session_for(user_id: Option<&str>) -> Result<Session, SyncError> {
    user_id
        .and_then(UserId::new)
        .map(Session::new)
        .ok_or(SyncError::MissingParameter(MISSING_USER_ID))
}

impl SyncService {
    /// Routes a request to the flow named by its `action`.
    ///
    /// # Errors
    ///
    /// [`SyncError::InvalidAction`] for an absent or unknown action,
    /// [`SyncError::MissingParameter`] when the action's fields are
    /// incomplete, and whatever the selected flow returns otherwise.
    pub async fn dispatch(&self, request: DispatchRequest) -> Result<DispatchResponse, SyncError> {
        let action: Action = request
            .action
            .as_deref()
            .ok_or(SyncError::InvalidAction)?
            .parse()?;

        tracing::debug!(?action, "dispatching action");
        match action {
            Action::ExchangeCode => self.dispatch_exchange(&request).await,
            Action::FetchRepositories => self.dispatch_repositories(&request).await,
            Action::FetchPullRequests => self.dispatch_pull_requests(&request).await,
            Action::CommentOnPr => self.dispatch_comment(&request).await,
        }
    }

    async fn dispatch_exchange(
        &self,
        request: &DispatchRequest,
    ) -> Result<DispatchResponse, SyncError> {
        let code = present(request.code.as_deref())
            .and_then(|code| AuthorizationCode::new(code).ok())
            .ok_or(SyncError::MissingParameter(MISSING_EXCHANGE_PARAMETERS))?;
        let session = session_for(request.user_id.as_deref())
            .map_err(|_| SyncError::MissingParameter(MISSING_EXCHANGE_PARAMETERS))?;

        let outcome = self.exchange_code(&session, &code).await?;
        Ok(DispatchResponse::ok(DispatchPayload::Connected {
            user: outcome.user,
            access_token: outcome.access_token.value().to_owned(),
        }))
    }

    async fn dispatch_repositories(
        &self,
        request: &DispatchRequest,
    ) -> Result<DispatchResponse, SyncError> {
        let token = access_token(request)
            .ok_or(SyncError::MissingParameter(MISSING_REPOSITORY_PARAMETERS))?;
        let session = session_for(request.user_id.as_deref())?;

        let synced = self.sync_repositories(&session, &token).await?;
        Ok(DispatchResponse::ok(DispatchPayload::Repositories {
            count: synced.count,
            repositories: synced.repositories,
        }))
    }

    async fn dispatch_pull_requests(
        &self,
        request: &DispatchRequest,
    ) -> Result<DispatchResponse, SyncError> {
        let token = access_token(request);
        let full_name = present(request.repo_full_name.as_deref());
        let (Some(token), Some(full_name)) = (token, full_name) else {
            return Err(SyncError::MissingParameter(MISSING_PULL_REQUEST_PARAMETERS));
        };
        let session = session_for(request.user_id.as_deref())?;
        // Nothing that fails to parse as owner/name can have been mirrored.
        let repository =
            RepositoryLocator::parse(full_name).map_err(|_| SyncError::RepositoryNotFound)?;

        let synced = self
            .sync_pull_requests(&session, &token, &repository)
            .await?;
        Ok(DispatchResponse::ok(DispatchPayload::PullRequests {
            count: synced.count,
            pull_requests: synced.pull_requests,
        }))
    }

    async fn dispatch_comment(
        &self,
        request: &DispatchRequest,
    ) -> Result<DispatchResponse, SyncError> {
        let missing = || SyncError::MissingParameter(MISSING_COMMENT_PARAMETERS);

        let token = access_token(request).ok_or_else(missing)?;
        let repository = present(request.repo_full_name.as_deref())
            .and_then(|full_name| RepositoryLocator::parse(full_name).ok())
            .ok_or_else(missing)?;
        let number = request
            .pr_number
            .and_then(|number| u64::try_from(number).ok())
            .and_then(|number| PullRequestNumber::new(number).ok())
            .ok_or_else(missing)?;
        let body = request
            .comment
            .as_deref()
            .filter(|comment| present(Some(*comment)).is_some())
            .ok_or_else(missing)?;

        let comment = self
            .comment_on_pull_request(&token, &repository, number, body)
            .await?;
        Ok(DispatchResponse::ok(DispatchPayload::Comment { comment }))
    }
}

fn access_token(request: &DispatchRequest) -> Option<AccessToken> {
    present(request.access_token.as_deref()).and_then(|token| AccessToken::new(token).ok())
}

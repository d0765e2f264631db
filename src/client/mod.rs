//! Typed client for the dispatcher, with a loading flag and notices.
//!
//! Each call needs a signed-in [`Session`]. While a call is in flight
//! [`PilotClient::is_loading`] reports `true`; the flag is cleared on every
//! exit path, including early returns and cancelled futures. Every dispatcher
//! call ends in exactly one [`Notice`].

mod callback;
mod error;
mod notice;

pub use callback::{AUTHORIZATION_DENIED, CallbackOutcome, MISSING_AUTHORIZATION_CODE};
pub use error::ClientError;
pub use notice::{Notice, NoticeSink, NoticeVariant, TracingNoticeSink};
#[cfg(any(test, feature = "test-support"))]
pub use notice::test_support;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::github::{AuthorizeTarget, GitHubIdentity};
use crate::persistence::{PullRequestRow, RepositoryRow};
use crate::server::{DISPATCH_PATH, ProfileView};
use crate::session::Session;
use crate::sync::DispatchRequest;

/// Account connected by a code exchange.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectedAccount {
    /// GitHub identity of the token owner.
    pub user: GitHubIdentity,
    /// The issued bearer token.
    pub access_token: String,
}

/// Outcome of a repository sync.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SyncedRepositories {
    /// Repositories GitHub returned.
    pub count: usize,
    /// Mirrored repositories after the sync.
    #[serde(default)]
    pub repositories: Vec<RepositoryRow>,
}

/// Outcome of a pull request sync.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SyncedPullRequests {
    /// Pull requests GitHub returned.
    pub count: usize,
    /// Mirrored open pull requests after the sync.
    #[serde(default)]
    pub pull_requests: Vec<PullRequestRow>,
}

/// A comment created on GitHub.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostedComment {
    /// GitHub's comment payload.
    pub comment: Value,
}

/// Sets the loading flag for as long as it lives.
struct LoadingGuard(Arc<AtomicBool>);

impl LoadingGuard {
    fn engage(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(Arc::clone(flag))
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The client-side hook layer.
pub struct PilotClient {
    http: reqwest::Client,
    base_url: Url,
    authorize: AuthorizeTarget,
    session: Option<Session>,
    notices: Arc<dyn NoticeSink>,
    loading: Arc<AtomicBool>,
}

impl PilotClient {
    /// Creates a signed-out client for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] when `base_url` does not parse.
    pub fn new(
        base_url: &str,
        authorize: AuthorizeTarget,
        notices: Arc<dyn NoticeSink>,
    ) -> Result<Self, ClientError> {
        let parsed =
            Url::parse(base_url).map_err(|error| ClientError::InvalidUrl(error.to_string()))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: parsed,
            authorize,
            session: None,
            notices,
            loading: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Signs `session` in for subsequent calls.
    #[must_use]
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Signs the current session out.
    pub fn sign_out(&mut self) {
        self.session = None;
    }

    /// Whether a call is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// URL that starts the GitHub OAuth flow.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] when the OAuth base is invalid.
    pub fn authorize_url(&self) -> Result<Url, ClientError> {
        self.authorize
            .url()
            .map_err(|error| ClientError::InvalidUrl(error.to_string()))
    }

    /// Finishes the OAuth flow from the callback URL GitHub redirected to.
    ///
    /// # Errors
    ///
    /// [`ClientError::Callback`] when the callback carries `error` or no
    /// code; otherwise as [`Self::exchange_code`].
    pub async fn complete_callback(&self, callback: &Url) -> Result<ConnectedAccount, ClientError> {
        match CallbackOutcome::from_url(callback) {
            CallbackOutcome::Code(code) => self.exchange_code(code.value()).await,
            CallbackOutcome::Denied => Err(ClientError::Callback(AUTHORIZATION_DENIED)),
            CallbackOutcome::MissingCode => Err(ClientError::Callback(MISSING_AUTHORIZATION_CODE)),
        }
    }

    /// Exchanges an OAuth code and connects the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotAuthenticated`] before any request when signed
    /// out; transport, service, or decode errors otherwise.
    pub async fn exchange_code(&self, code: &str) -> Result<ConnectedAccount, ClientError> {
        let session = self.session()?;
        let request = DispatchRequest {
            action: Some("exchange_code".to_owned()),
            code: Some(code.to_owned()),
            user_id: Some(session.user_id().to_string()),
            ..DispatchRequest::default()
        };

        self.run(
            &request,
            |account: &ConnectedAccount| {
                Notice::success(
                    "Connected to GitHub",
                    format!("Successfully connected as {}", account.user.login),
                )
            },
            Notice::failure(
                "Connection failed",
                "Failed to connect to GitHub. Please try again.",
            ),
        )
        .await
    }

    /// Mirrors the token owner's repositories.
    ///
    /// # Errors
    ///
    /// As [`Self::exchange_code`].
    pub async fn sync_repositories(
        &self,
        access_token: &str,
    ) -> Result<SyncedRepositories, ClientError> {
        let session = self.session()?;
        let request = DispatchRequest {
            action: Some("fetch_repositories".to_owned()),
            user_id: Some(session.user_id().to_string()),
            access_token: Some(access_token.to_owned()),
            ..DispatchRequest::default()
        };

        self.run(
            &request,
            |synced: &SyncedRepositories| {
                Notice::success(
                    "Repositories synced",
                    format!("Successfully synced {} repositories", synced.count),
                )
            },
            Notice::failure(
                "Sync failed",
                "Failed to sync repositories. Please try again.",
            ),
        )
        .await
    }

    /// Mirrors the open pull requests of `repo_full_name`.
    ///
    /// # Errors
    ///
    /// As [`Self::exchange_code`].
    pub async fn sync_pull_requests(
        &self,
        access_token: &str,
        repo_full_name: &str,
    ) -> Result<SyncedPullRequests, ClientError> {
        let session = self.session()?;
        let request = DispatchRequest {
            action: Some("fetch_pull_requests".to_owned()),
            user_id: Some(session.user_id().to_string()),
            access_token: Some(access_token.to_owned()),
            repo_full_name: Some(repo_full_name.to_owned()),
            ..DispatchRequest::default()
        };

        self.run(
            &request,
            |synced: &SyncedPullRequests| {
                Notice::success(
                    "Pull requests synced",
                    format!("Successfully synced {} pull requests", synced.count),
                )
            },
            Notice::failure(
                "Sync failed",
                "Failed to sync pull requests. Please try again.",
            ),
        )
        .await
    }

    /// Posts `comment` on pull request `pr_number` of `repo_full_name`.
    ///
    /// # Errors
    ///
    /// As [`Self::exchange_code`].
    pub async fn comment_on_pull_request(
        &self,
        access_token: &str,
        repo_full_name: &str,
        pr_number: i64,
        comment: &str,
    ) -> Result<PostedComment, ClientError> {
        let session = self.session()?;
        let request = DispatchRequest {
            action: Some("comment_on_pr".to_owned()),
            user_id: Some(session.user_id().to_string()),
            access_token: Some(access_token.to_owned()),
            repo_full_name: Some(repo_full_name.to_owned()),
            pr_number: Some(pr_number),
            comment: Some(comment.to_owned()),
            ..DispatchRequest::default()
        };

        self.run(
            &request,
            |_: &PostedComment| {
                Notice::success(
                    "Comment posted",
                    "Successfully posted comment to pull request",
                )
            },
            Notice::failure("Comment failed", "Failed to post comment. Please try again."),
        )
        .await
    }

    /// Loads the signed-in user's profile; `None` when nothing is stored.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotAuthenticated`] when signed out; transport,
    /// service, or decode errors otherwise.
    pub async fn load_profile(&self) -> Result<Option<ProfileView>, ClientError> {
        let session = self.session()?;
        let url = self.endpoint(&["profiles", session.user_id().as_str()])?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|error| transport_error(&error))?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_body(response).await.map(Some)
    }

    fn session(&self) -> Result<&Session, ClientError> {
        self.session.as_ref().ok_or(ClientError::NotAuthenticated)
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ClientError::InvalidUrl(format!("{} cannot be a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn run<T, F>(
        &self,
        request: &DispatchRequest,
        on_success: F,
        on_failure: Notice,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        F: FnOnce(&T) -> Notice,
    {
        let _loading = LoadingGuard::engage(&self.loading);

        match self.dispatch(request).await {
            Ok(payload) => {
                self.notices.notify(on_success(&payload));
                Ok(payload)
            }
            Err(error) => {
                tracing::error!(action = ?request.action, error = %error, "dispatcher call failed");
                self.notices.notify(on_failure);
                Err(error)
            }
        }
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        request: &DispatchRequest,
    ) -> Result<T, ClientError> {
        let response = self
            .http
            .post(self.endpoint(&[DISPATCH_PATH.trim_start_matches('/')])?)
            .json(request)
            .send()
            .await
            .map_err(|error| transport_error(&error))?;
        read_body(response).await
    }
}

async fn read_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    let body: Value = response.json().await.map_err(|error| ClientError::Decode {
        message: error.to_string(),
    })?;

    if let Some(message) = body.get("error").and_then(Value::as_str) {
        return Err(ClientError::Service {
            status: status.as_u16(),
            message: message.to_owned(),
        });
    }
    if !status.is_success() {
        return Err(ClientError::Service {
            status: status.as_u16(),
            message: status.to_string(),
        });
    }

    serde_json::from_value(body).map_err(|error| ClientError::Decode {
        message: error.to_string(),
    })
}

fn transport_error(error: &reqwest::Error) -> ClientError {
    ClientError::Transport {
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests;

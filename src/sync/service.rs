//! The four sync flows: code exchange, repository sync, pull request sync,
//! and comment posting.

use std::sync::Arc;

use serde_json::Value;

use crate::github::{
    AccessToken, AuthorizationCode, GitHubGateway, GitHubIdentity, PullRequestNumber,
    RepositoryLocator, TokenExchange,
};
use crate::persistence::{
    MirrorStore, PersistenceError, ProfileRow, PullRequestRow, RepositoryRow,
};
use crate::session::{Session, UserId};
use crate::telemetry::{TelemetryEvent, TelemetrySink};

use super::SyncError;

/// Result of a successful code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeOutcome {
    /// The GitHub account that owns the new token.
    pub user: GitHubIdentity,
    /// The issued bearer token.
    pub access_token: AccessToken,
}

/// Result of a repository sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySync {
    /// Repositories GitHub returned.
    pub count: usize,
    /// The user's mirrored repositories after the upsert.
    pub repositories: Vec<RepositoryRow>,
}

/// Result of a pull request sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestSync {
    /// Open pull requests GitHub returned.
    pub count: usize,
    /// The repository's mirrored open pull requests after the upsert.
    pub pull_requests: Vec<PullRequestRow>,
}

/// Orchestrates GitHub calls and mirror writes for each action.
#[derive(Clone)]
pub struct SyncService {
    gateway: Arc<dyn GitHubGateway>,
    exchange: Arc<dyn TokenExchange>,
    store: Arc<dyn MirrorStore>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl SyncService {
    /// Assemble a service from its collaborators.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn GitHubGateway>,
        exchange: Arc<dyn TokenExchange>,
        store: Arc<dyn MirrorStore>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self {
            gateway,
            exchange,
            store,
            telemetry,
        }
    }

    /// Trades an authorization code for a token and records the connected
    /// account on the session user's profile.
    ///
    /// # Errors
    ///
    /// [`SyncError::Exchange`] when GitHub refuses the code,
    /// [`SyncError::ProfileUpdate`] when the profile write fails, and
    /// [`SyncError::Internal`] for any other failure.
    pub async fn exchange_code(
        &self,
        session: &Session,
        code: &AuthorizationCode,
    ) -> Result<ExchangeOutcome, SyncError> {
        let access_token = self
            .exchange
            .exchange_code(code)
            .await
            .map_err(SyncError::from_exchange)?;

        let user = self
            .gateway
            .authenticated_user(&access_token)
            .await
            .map_err(SyncError::internal)?;

        let user_id = session.user_id().clone();
        let identity = user.clone();
        let token = access_token.clone();
        self.with_store(move |store| store.save_profile(&user_id, &identity, &token))
            .await
            .map_err(|error| {
                tracing::error!(user_id = %session.user_id(), error = %error, "profile update failed");
                SyncError::ProfileUpdate {
                    message: error.to_string(),
                }
            })?;

        tracing::info!(user_id = %session.user_id(), login = %user.login, "connected GitHub account");
        Ok(ExchangeOutcome { user, access_token })
    }

    /// Mirrors the most recently updated repositories of the token owner.
    ///
    /// A failed upsert is logged and does not fail the call.
    ///
    /// # Errors
    ///
    /// [`SyncError::Internal`] when GitHub cannot be read.
    pub async fn sync_repositories(
        &self,
        session: &Session,
        token: &AccessToken,
    ) -> Result<RepositorySync, SyncError> {
        let fetched = self
            .gateway
            .repositories(token)
            .await
            .map_err(SyncError::internal)?;
        let count = fetched.len();

        let user_id = session.user_id().clone();
        let persisted = self
            .with_store(move |store| store.upsert_repositories(&user_id, &fetched))
            .await
            .unwrap_or_else(|error| {
                tracing::error!(user_id = %session.user_id(), error = %error, "repository upsert failed");
                0
            });

        self.telemetry.record(TelemetryEvent::RepositoriesSynced {
            user_id: session.user_id().to_string(),
            fetched: count,
            persisted,
        });

        let owner = session.user_id().clone();
        let repositories = self
            .with_store(move |store| store.repositories(&owner))
            .await
            .unwrap_or_else(|error| {
                tracing::error!(user_id = %session.user_id(), error = %error, "repository read-back failed");
                Vec::new()
            });

        Ok(RepositorySync {
            count,
            repositories,
        })
    }

    /// Mirrors the open pull requests of a repository that was synced
    /// earlier for the same user.
    ///
    /// # Errors
    ///
    /// [`SyncError::RepositoryNotFound`] when the repository is not mirrored
    /// for this user (GitHub is not called), [`SyncError::Internal`] for
    /// store lookups or GitHub failures.
    pub async fn sync_pull_requests(
        &self,
        session: &Session,
        token: &AccessToken,
        repository: &RepositoryLocator,
    ) -> Result<PullRequestSync, SyncError> {
        let owner = session.user_id().clone();
        let full_name = repository.full_name();
        let mirrored = self
            .with_store(move |store| store.find_repository(&owner, &full_name))
            .await?
            .ok_or(SyncError::RepositoryNotFound)?;

        let fetched = self
            .gateway
            .open_pull_requests(token, repository)
            .await
            .map_err(SyncError::internal)?;
        let count = fetched.len();

        let user_id = session.user_id().clone();
        let repository_id = mirrored.id;
        let persisted = self
            .with_store(move |store| store.upsert_pull_requests(&user_id, repository_id, &fetched))
            .await
            .unwrap_or_else(|error| {
                tracing::error!(
                    user_id = %session.user_id(),
                    repository = %repository,
                    error = %error,
                    "pull request upsert failed"
                );
                0
            });

        self.telemetry.record(TelemetryEvent::PullRequestsSynced {
            user_id: session.user_id().to_string(),
            repository: repository.full_name(),
            fetched: count,
            persisted,
        });

        let pull_requests = self
            .with_store(move |store| store.open_pull_requests(repository_id))
            .await
            .unwrap_or_else(|error| {
                tracing::error!(repository = %repository, error = %error, "pull request read-back failed");
                Vec::new()
            });

        Ok(PullRequestSync {
            count,
            pull_requests,
        })
    }

    /// Posts `body` as an issue comment on a pull request.
    ///
    /// # Errors
    ///
    /// [`SyncError::MissingParameter`] for a blank body (no request is
    /// sent), [`SyncError::CommentRejected`] when GitHub refuses the comment,
    /// and [`SyncError::Internal`] on transport failures.
    pub async fn comment_on_pull_request(
        &self,
        token: &AccessToken,
        repository: &RepositoryLocator,
        number: PullRequestNumber,
        body: &str,
    ) -> Result<Value, SyncError> {
        if body.trim().is_empty() {
            return Err(SyncError::MissingParameter(super::MISSING_COMMENT_PARAMETERS));
        }

        self.gateway
            .post_comment(token, repository, number, body)
            .await
            .map_err(|error| {
                tracing::warn!(repository = %repository, number = number.get(), error = %error, "comment not posted");
                SyncError::from_comment(error)
            })
    }

    /// Loads the profile of `user_id` for the read endpoints.
    pub(crate) async fn profile(
        &self,
        user_id: UserId,
    ) -> Result<Option<ProfileRow>, SyncError> {
        self.with_store(move |store| store.profile(&user_id))
            .await
            .map_err(SyncError::from)
    }

    /// Lists the mirrored repositories of `user_id`.
    pub(crate) async fn repositories(
        &self,
        user_id: UserId,
    ) -> Result<Vec<RepositoryRow>, SyncError> {
        self.with_store(move |store| store.repositories(&user_id))
            .await
            .map_err(SyncError::from)
    }

    /// Lists the mirrored open pull requests of `repository_id`.
    pub(crate) async fn open_pull_requests(
        &self,
        repository_id: i64,
    ) -> Result<Vec<PullRequestRow>, SyncError> {
        self.with_store(move |store| store.open_pull_requests(repository_id))
            .await
            .map_err(SyncError::from)
    }

    async fn with_store<T, F>(&self, operation: F) -> Result<T, PersistenceError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn MirrorStore) -> Result<T, PersistenceError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        match tokio::task::spawn_blocking(move || operation(store.as_ref())).await {
            Ok(result) => result,
            Err(error) => Err(PersistenceError::QueryFailed {
                message: format!("store task did not complete: {error}"),
            }),
        }
    }
}

//! The `SQLite` mirror of profiles, repositories, and pull requests.
//!
//! All writes are upserts keyed by the GitHub-assigned id (profiles are keyed
//! by local user id) and nothing is ever deleted. Each call opens its own
//! connection with foreign keys enabled, mirroring the request-scoped access
//! pattern of the HTTP layer.

mod profiles;
mod pull_requests;
mod repositories;

use std::sync::Arc;

use diesel::QueryableByName;
use diesel::RunQueryDsl;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Bool, Nullable, Text};
use diesel::sqlite::SqliteConnection;
use serde::{Deserialize, Serialize};

use crate::github::{AccessToken, GitHubIdentity, PullRequestSnapshot, RepositorySnapshot};
use crate::session::UserId;

use super::PersistenceError;
use super::migrator::establish_connection;
use super::token_cipher::TokenCipher;

/// A stored profile with its access token already decrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRow {
    /// Local user id.
    pub id: String,
    /// Connected GitHub login.
    pub github_username: Option<String>,
    /// Connected GitHub avatar.
    pub github_avatar_url: Option<String>,
    /// Decrypted bearer token.
    pub github_access_token: Option<String>,
    /// Row creation time.
    pub created_at: String,
    /// Last write time.
    pub updated_at: String,
}

/// A mirrored repository row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, QueryableByName)]
pub struct RepositoryRow {
    /// GitHub repository id.
    #[diesel(sql_type = BigInt)]
    pub id: i64,
    /// Owning local user.
    #[diesel(sql_type = Text)]
    pub user_id: String,
    /// Short name.
    #[diesel(sql_type = Text)]
    pub name: String,
    /// `owner/name`.
    #[diesel(sql_type = Text)]
    pub full_name: String,
    /// Description text.
    #[diesel(sql_type = Nullable<Text>)]
    pub description: Option<String>,
    /// Browser URL.
    #[diesel(sql_type = Text)]
    pub html_url: String,
    /// HTTPS clone URL.
    #[diesel(sql_type = Text)]
    pub clone_url: String,
    /// Default branch.
    #[diesel(sql_type = Nullable<Text>)]
    pub default_branch: Option<String>,
    /// Visibility flag.
    #[diesel(sql_type = Nullable<Bool>)]
    pub is_private: Option<bool>,
    /// Stargazers.
    #[diesel(sql_type = Nullable<BigInt>)]
    pub stars_count: Option<i64>,
    /// Forks.
    #[diesel(sql_type = Nullable<BigInt>)]
    pub forks_count: Option<i64>,
    /// Primary language.
    #[diesel(sql_type = Nullable<Text>)]
    pub language: Option<String>,
    /// Row creation time.
    #[diesel(sql_type = Text)]
    pub created_at: String,
    /// Last write time.
    #[diesel(sql_type = Text)]
    pub updated_at: String,
}

/// A mirrored pull request row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, QueryableByName)]
pub struct PullRequestRow {
    /// GitHub pull request id.
    #[diesel(sql_type = BigInt)]
    pub id: i64,
    /// Owning repository id.
    #[diesel(sql_type = BigInt)]
    pub repository_id: i64,
    /// Local user that synced the row.
    #[diesel(sql_type = Text)]
    pub user_id: String,
    /// Pull request number.
    #[diesel(sql_type = BigInt)]
    pub number: i64,
    /// Title.
    #[diesel(sql_type = Text)]
    pub title: String,
    /// Body text.
    #[diesel(sql_type = Nullable<Text>)]
    pub body: Option<String>,
    /// State as last synced.
    #[diesel(sql_type = Text)]
    pub state: String,
    /// Browser URL.
    #[diesel(sql_type = Text)]
    pub html_url: String,
    /// Head branch.
    #[diesel(sql_type = Text)]
    pub head_branch: String,
    /// Base branch.
    #[diesel(sql_type = Text)]
    pub base_branch: String,
    /// Author login.
    #[diesel(sql_type = Nullable<Text>)]
    pub author_username: Option<String>,
    /// Author avatar.
    #[diesel(sql_type = Nullable<Text>)]
    pub author_avatar_url: Option<String>,
    /// Row creation time.
    #[diesel(sql_type = Text)]
    pub created_at: String,
    /// Last write time.
    #[diesel(sql_type = Text)]
    pub updated_at: String,
}

/// Select/upsert primitives over the three mirror tables.
#[cfg_attr(test, mockall::automock)]
pub trait MirrorStore: Send + Sync {
    /// Inserts or refreshes the profile of `user_id` with a GitHub identity
    /// and token.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the write fails.
    fn save_profile(
        &self,
        user_id: &UserId,
        identity: &GitHubIdentity,
        token: &AccessToken,
    ) -> Result<(), PersistenceError>;

    /// Loads the profile of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the query fails.
    fn profile(&self, user_id: &UserId) -> Result<Option<ProfileRow>, PersistenceError>;

    /// Upserts repositories for `user_id` in one batch, returning rows written.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the batch fails; no row of a failed
    /// batch is kept.
    fn upsert_repositories(
        &self,
        user_id: &UserId,
        repositories: &[RepositorySnapshot],
    ) -> Result<usize, PersistenceError>;

    /// Resolves a repository by `(full_name, user_id)`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the query fails.
    fn find_repository(
        &self,
        user_id: &UserId,
        full_name: &str,
    ) -> Result<Option<RepositoryRow>, PersistenceError>;

    /// Lists repositories of `user_id`, most starred first.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the query fails.
    fn repositories(&self, user_id: &UserId) -> Result<Vec<RepositoryRow>, PersistenceError>;

    /// Upserts pull requests of `repository_id` in one batch, returning rows
    /// written.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the batch fails.
    fn upsert_pull_requests(
        &self,
        user_id: &UserId,
        repository_id: i64,
        pull_requests: &[PullRequestSnapshot],
    ) -> Result<usize, PersistenceError>;

    /// Lists open pull requests of `repository_id`, newest number first.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the query fails.
    fn open_pull_requests(
        &self,
        repository_id: i64,
    ) -> Result<Vec<PullRequestRow>, PersistenceError>;
}

/// Diesel/`SQLite` implementation of [`MirrorStore`].
#[derive(Debug, Clone)]
pub struct SqliteMirrorStore {
    database_url: String,
    cipher: Arc<TokenCipher>,
}

impl SqliteMirrorStore {
    /// Create a store targeting `database_url`, sealing tokens with `cipher`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::BlankDatabaseUrl`] when the URL is blank.
    pub fn new(
        database_url: impl Into<String>,
        cipher: TokenCipher,
    ) -> Result<Self, PersistenceError> {
        let database_url_string = database_url.into();
        if database_url_string.trim().is_empty() {
            return Err(PersistenceError::BlankDatabaseUrl);
        }
        Ok(Self {
            database_url: database_url_string,
            cipher: Arc::new(cipher),
        })
    }

    fn connect(&self) -> Result<SqliteConnection, PersistenceError> {
        establish_connection(&self.database_url)
    }
}

impl MirrorStore for SqliteMirrorStore {
    fn save_profile(
        &self,
        user_id: &UserId,
        identity: &GitHubIdentity,
        token: &AccessToken,
    ) -> Result<(), PersistenceError> {
        let sealed = self.cipher.seal(token.value())?;
        let mut connection = self.connect()?;
        profiles::upsert(&mut connection, user_id, identity, &sealed)
    }

    fn profile(&self, user_id: &UserId) -> Result<Option<ProfileRow>, PersistenceError> {
        let mut connection = self.connect()?;
        let Some(stored) = profiles::find(&mut connection, user_id)? else {
            return Ok(None);
        };

        let github_access_token = stored
            .github_access_token
            .as_deref()
            .map(|sealed| self.cipher.open(sealed))
            .transpose()?;

        Ok(Some(ProfileRow {
            id: stored.id,
            github_username: stored.github_username,
            github_avatar_url: stored.github_avatar_url,
            github_access_token,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }))
    }

    fn upsert_repositories(
        &self,
        user_id: &UserId,
        repositories: &[RepositorySnapshot],
    ) -> Result<usize, PersistenceError> {
        if repositories.is_empty() {
            return Ok(0);
        }
        let mut connection = self.connect()?;
        repositories::upsert_all(&mut connection, user_id, repositories)
    }

    fn find_repository(
        &self,
        user_id: &UserId,
        full_name: &str,
    ) -> Result<Option<RepositoryRow>, PersistenceError> {
        let mut connection = self.connect()?;
        repositories::find_by_full_name(&mut connection, user_id, full_name)
    }

    fn repositories(&self, user_id: &UserId) -> Result<Vec<RepositoryRow>, PersistenceError> {
        let mut connection = self.connect()?;
        repositories::list_for_user(&mut connection, user_id)
    }

    fn upsert_pull_requests(
        &self,
        user_id: &UserId,
        repository_id: i64,
        pull_requests: &[PullRequestSnapshot],
    ) -> Result<usize, PersistenceError> {
        if pull_requests.is_empty() {
            return Ok(0);
        }
        let mut connection = self.connect()?;
        pull_requests::upsert_all(&mut connection, user_id, repository_id, pull_requests)
    }

    fn open_pull_requests(
        &self,
        repository_id: i64,
    ) -> Result<Vec<PullRequestRow>, PersistenceError> {
        let mut connection = self.connect()?;
        pull_requests::list_open(&mut connection, repository_id)
    }
}

fn table_exists(
    connection: &mut SqliteConnection,
    table: &str,
) -> Result<bool, diesel::result::Error> {
    #[derive(Debug, QueryableByName)]
    struct Row {
        #[diesel(sql_type = BigInt)]
        count: i64,
    }

    let row: Row = sql_query(
        "SELECT COUNT(*) AS count FROM sqlite_master WHERE type = 'table' AND name = ?;",
    )
    .bind::<Text, _>(table)
    .get_result(connection)?;

    Ok(row.count > 0)
}

fn map_error_with_schema_check<F>(
    connection: &mut SqliteConnection,
    table: &str,
    error: &diesel::result::Error,
    create_error: F,
) -> PersistenceError
where
    F: Fn(String) -> PersistenceError,
{
    match table_exists(connection, table) {
        Ok(false) => PersistenceError::SchemaNotInitialised,
        Ok(true) => create_error(error.to_string()),
        Err(check_error) => create_error(format!(
            "schema presence check failed: {check_error}; original error: {error}"
        )),
    }
}

fn map_query_error(
    connection: &mut SqliteConnection,
    table: &str,
    error: &diesel::result::Error,
) -> PersistenceError {
    map_error_with_schema_check(connection, table, error, |message| {
        PersistenceError::QueryFailed { message }
    })
}

fn map_write_error(
    connection: &mut SqliteConnection,
    table: &str,
    error: &diesel::result::Error,
) -> PersistenceError {
    map_error_with_schema_check(connection, table, error, |message| {
        PersistenceError::WriteFailed { message }
    })
}

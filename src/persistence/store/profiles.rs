//! `profiles` table access.

use diesel::OptionalExtension;
use diesel::QueryableByName;
use diesel::RunQueryDsl;
use diesel::sql_query;
use diesel::sql_types::{Nullable, Text};
use diesel::sqlite::SqliteConnection;

use crate::github::GitHubIdentity;
use crate::persistence::PersistenceError;
use crate::session::UserId;

use super::{map_query_error, map_write_error};

const PROFILES_TABLE: &str = "profiles";

/// A profile as stored, with the token still sealed.
#[derive(Debug, QueryableByName)]
pub(super) struct StoredProfile {
    #[diesel(sql_type = Text)]
    pub(super) id: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub(super) github_username: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub(super) github_avatar_url: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub(super) github_access_token: Option<String>,
    #[diesel(sql_type = Text)]
    pub(super) created_at: String,
    #[diesel(sql_type = Text)]
    pub(super) updated_at: String,
}

pub(super) fn upsert(
    connection: &mut SqliteConnection,
    user_id: &UserId,
    identity: &GitHubIdentity,
    sealed_token: &str,
) -> Result<(), PersistenceError> {
    sql_query(
        "INSERT INTO profiles (id, github_username, github_avatar_url, github_access_token) \
         VALUES (?, ?, ?, ?) \
         ON CONFLICT(id) DO UPDATE SET \
           github_username = excluded.github_username, \
           github_avatar_url = excluded.github_avatar_url, \
           github_access_token = excluded.github_access_token, \
           updated_at = CURRENT_TIMESTAMP;",
    )
    .bind::<Text, _>(user_id.as_str())
    .bind::<Nullable<Text>, _>(Some(identity.login.as_str()))
    .bind::<Nullable<Text>, _>(identity.avatar_url.as_deref())
    .bind::<Nullable<Text>, _>(Some(sealed_token))
    .execute(connection)
    .map(drop)
    .map_err(|error| map_write_error(connection, PROFILES_TABLE, &error))
}

pub(super) fn find(
    connection: &mut SqliteConnection,
    user_id: &UserId,
) -> Result<Option<StoredProfile>, PersistenceError> {
    sql_query(
        "SELECT id, github_username, github_avatar_url, github_access_token, \
         created_at, updated_at \
         FROM profiles WHERE id = ? LIMIT 1;",
    )
    .bind::<Text, _>(user_id.as_str())
    .get_result(connection)
    .optional()
    .map_err(|error| map_query_error(connection, PROFILES_TABLE, &error))
}

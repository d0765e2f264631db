//! `pull_requests` table access.

use diesel::Connection;
use diesel::RunQueryDsl;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Nullable, Text};
use diesel::sqlite::SqliteConnection;

use crate::github::PullRequestSnapshot;
use crate::persistence::PersistenceError;
use crate::session::UserId;

use super::{PullRequestRow, map_query_error, map_write_error};

const PULL_REQUESTS_TABLE: &str = "pull_requests";

pub(super) fn upsert_all(
    connection: &mut SqliteConnection,
    user_id: &UserId,
    repository_id: i64,
    pull_requests: &[PullRequestSnapshot],
) -> Result<usize, PersistenceError> {
    let outcome = connection.transaction::<usize, diesel::result::Error, _>(|transaction| {
        let mut written = 0;
        for pull_request in pull_requests {
            written += upsert_one(transaction, user_id, repository_id, pull_request)?;
        }
        Ok(written)
    });

    outcome.map_err(|error| map_write_error(connection, PULL_REQUESTS_TABLE, &error))
}

fn upsert_one(
    connection: &mut SqliteConnection,
    user_id: &UserId,
    repository_id: i64,
    pull_request: &PullRequestSnapshot,
) -> Result<usize, diesel::result::Error> {
    sql_query(
        "INSERT INTO pull_requests \
         (id, repository_id, user_id, number, title, body, state, html_url, head_branch, \
          base_branch, author_username, author_avatar_url) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT(id) DO UPDATE SET \
           repository_id = excluded.repository_id, \
           user_id = excluded.user_id, \
           number = excluded.number, \
           title = excluded.title, \
           body = excluded.body, \
           state = excluded.state, \
           html_url = excluded.html_url, \
           head_branch = excluded.head_branch, \
           base_branch = excluded.base_branch, \
           author_username = excluded.author_username, \
           author_avatar_url = excluded.author_avatar_url, \
           updated_at = CURRENT_TIMESTAMP;",
    )
    .bind::<BigInt, _>(pull_request.id)
    .bind::<BigInt, _>(repository_id)
    .bind::<Text, _>(user_id.as_str())
    .bind::<BigInt, _>(pull_request.number)
    .bind::<Text, _>(pull_request.title.as_str())
    .bind::<Nullable<Text>, _>(pull_request.body.as_deref())
    .bind::<Text, _>(pull_request.state.as_str())
    .bind::<Text, _>(pull_request.html_url.as_str())
    .bind::<Text, _>(pull_request.head_branch.as_str())
    .bind::<Text, _>(pull_request.base_branch.as_str())
    .bind::<Nullable<Text>, _>(pull_request.author_username.as_deref())
    .bind::<Nullable<Text>, _>(pull_request.author_avatar_url.as_deref())
    .execute(connection)
}

pub(super) fn list_open(
    connection: &mut SqliteConnection,
    repository_id: i64,
) -> Result<Vec<PullRequestRow>, PersistenceError> {
    sql_query(
        "SELECT id, repository_id, user_id, number, title, body, state, html_url, \
         head_branch, base_branch, author_username, author_avatar_url, created_at, updated_at \
         FROM pull_requests \
         WHERE repository_id = ? AND state = 'open' \
         ORDER BY number DESC;",
    )
    .bind::<BigInt, _>(repository_id)
    .load(connection)
    .map_err(|error| map_query_error(connection, PULL_REQUESTS_TABLE, &error))
}

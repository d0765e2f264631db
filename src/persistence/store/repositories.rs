//! `repositories` table access.

use diesel::Connection;
use diesel::OptionalExtension;
use diesel::RunQueryDsl;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Bool, Nullable, Text};
use diesel::sqlite::SqliteConnection;

use crate::github::RepositorySnapshot;
use crate::persistence::PersistenceError;
use crate::session::UserId;

use super::{RepositoryRow, map_query_error, map_write_error};

const REPOSITORIES_TABLE: &str = "repositories";

const SELECT_COLUMNS: &str = "SELECT id, user_id, name, full_name, description, html_url, \
     clone_url, default_branch, is_private, stars_count, forks_count, language, \
     created_at, updated_at FROM repositories";

pub(super) fn upsert_all(
    connection: &mut SqliteConnection,
    user_id: &UserId,
    repositories: &[RepositorySnapshot],
) -> Result<usize, PersistenceError> {
    let outcome = connection.transaction::<usize, diesel::result::Error, _>(|transaction| {
        let mut written = 0;
        for repository in repositories {
            written += upsert_one(transaction, user_id, repository)?;
        }
        Ok(written)
    });

    outcome.map_err(|error| map_write_error(connection, REPOSITORIES_TABLE, &error))
}

fn upsert_one(
    connection: &mut SqliteConnection,
    user_id: &UserId,
    repository: &RepositorySnapshot,
) -> Result<usize, diesel::result::Error> {
    sql_query(
        "INSERT INTO repositories \
         (id, user_id, name, full_name, description, html_url, clone_url, default_branch, \
          is_private, stars_count, forks_count, language) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT(id) DO UPDATE SET \
           user_id = excluded.user_id, \
           name = excluded.name, \
           full_name = excluded.full_name, \
           description = excluded.description, \
           html_url = excluded.html_url, \
           clone_url = excluded.clone_url, \
           default_branch = excluded.default_branch, \
           is_private = excluded.is_private, \
           stars_count = excluded.stars_count, \
           forks_count = excluded.forks_count, \
           language = excluded.language, \
           updated_at = CURRENT_TIMESTAMP;",
    )
    .bind::<BigInt, _>(repository.id)
    .bind::<Text, _>(user_id.as_str())
    .bind::<Text, _>(repository.name.as_str())
    .bind::<Text, _>(repository.full_name.as_str())
    .bind::<Nullable<Text>, _>(repository.description.as_deref())
    .bind::<Text, _>(repository.html_url.as_str())
    .bind::<Text, _>(repository.clone_url.as_str())
    .bind::<Nullable<Text>, _>(repository.default_branch.as_deref())
    .bind::<Bool, _>(repository.is_private)
    .bind::<BigInt, _>(repository.stars_count)
    .bind::<BigInt, _>(repository.forks_count)
    .bind::<Nullable<Text>, _>(repository.language.as_deref())
    .execute(connection)
}

pub(super) fn find_by_full_name(
    connection: &mut SqliteConnection,
    user_id: &UserId,
    full_name: &str,
) -> Result<Option<RepositoryRow>, PersistenceError> {
    sql_query(format!(
        "{SELECT_COLUMNS} WHERE full_name = ? AND user_id = ? LIMIT 1;"
    ))
    .bind::<Text, _>(full_name)
    .bind::<Text, _>(user_id.as_str())
    .get_result(connection)
    .optional()
    .map_err(|error| map_query_error(connection, REPOSITORIES_TABLE, &error))
}

pub(super) fn list_for_user(
    connection: &mut SqliteConnection,
    user_id: &UserId,
) -> Result<Vec<RepositoryRow>, PersistenceError> {
    sql_query(format!(
        "{SELECT_COLUMNS} WHERE user_id = ? ORDER BY stars_count DESC, full_name ASC;"
    ))
    .bind::<Text, _>(user_id.as_str())
    .load(connection)
    .map_err(|error| map_query_error(connection, REPOSITORIES_TABLE, &error))
}

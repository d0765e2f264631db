//! Local persistence and database migrations.
//!
//! The service mirrors GitHub profiles, repositories, and open pull requests
//! into a `SQLite` database. The schema is managed with Diesel migrations and
//! stored access tokens are sealed with age before they reach disk.

mod error;
mod migrator;
mod store;
mod token_cipher;

pub use error::PersistenceError;
pub use migrator::{
    CURRENT_SCHEMA_VERSION, INITIAL_SCHEMA_VERSION, SchemaVersion, migrate_database,
};
#[cfg(test)]
pub use store::MockMirrorStore;
pub use store::{MirrorStore, ProfileRow, PullRequestRow, RepositoryRow, SqliteMirrorStore};
pub use token_cipher::TokenCipher;

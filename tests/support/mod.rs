//! Shared test utilities.

use tempfile::TempDir;

/// Creates a temporary directory for database tests.
///
/// # Panics
///
/// Panics if the temporary directory cannot be created.
pub fn create_temp_dir() -> TempDir {
    TempDir::new().unwrap_or_else(|error| panic!("failed to create temporary directory: {error}"))
}

/// Path of the mirror database file inside `temp_dir`.
pub fn database_url_in(temp_dir: &TempDir) -> String {
    temp_dir
        .path()
        .join("pr-pilot.sqlite")
        .to_string_lossy()
        .into_owned()
}

//! `pr-pilot`: connect a GitHub account, mirror repositories and open pull
//! requests into `SQLite`, and comment back on GitHub.
//!
//! The service is a thin orchestration layer. A single dispatcher endpoint
//! accepts an action (`exchange_code`, `fetch_repositories`,
//! `fetch_pull_requests`, `comment_on_pr`), calls GitHub through Octocrab, and
//! upserts the results. [`client::PilotClient`] is the typed caller a UI
//! drives, with a loading flag and user-facing notices.

pub mod app;
pub mod client;
pub mod config;
pub mod github;
pub mod logging;
pub mod persistence;
pub mod server;
pub mod session;
pub mod sync;
pub mod telemetry;

pub use config::{ConfigError, PilotConfig};
pub use github::GitHubError;
pub use persistence::PersistenceError;
pub use session::{Session, UserId};
pub use sync::{SyncError, SyncService};

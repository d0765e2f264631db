//! The action dispatcher and its sync flows.
//!
//! A single request carries an `action` and the union of every action's
//! fields. [`SyncService::dispatch`] validates the fields the chosen action
//! needs, builds the caller's [`crate::session::Session`], and runs one of
//! four flows against GitHub and the mirror.

mod error;
mod request;
mod service;

pub use error::{INTERNAL_ERROR_MESSAGE, SyncError};
pub use request::{Action, DispatchPayload, DispatchRequest, DispatchResponse};
pub use service::{ExchangeOutcome, PullRequestSync, RepositorySync, SyncService};

const MISSING_EXCHANGE_PARAMETERS: &str = "Authorization code and user id required";
const MISSING_REPOSITORY_PARAMETERS: &str = "Access token required";
const MISSING_PULL_REQUEST_PARAMETERS: &str = "Access token and repository name required";
const MISSING_COMMENT_PARAMETERS: &str = "Missing required parameters";
const MISSING_USER_ID: &str = "User id required";

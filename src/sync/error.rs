//! Failure taxonomy of the action dispatcher.

use http::StatusCode;
use thiserror::Error;

use crate::github::GitHubError;
use crate::persistence::PersistenceError;

/// Message returned for every failure whose detail stays server-side.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Errors a dispatched action can end in.
///
/// `Display` carries the full detail for logs. What reaches the caller is
/// [`SyncError::public_message`] together with [`SyncError::status`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    /// GitHub's token endpoint refused the code.
    #[error("token exchange failed: {message}")]
    Exchange {
        /// `error_description` from GitHub or the generic fallback.
        message: String,
    },

    /// The profile row could not be written after a successful exchange.
    #[error("failed to update profile: {message}")]
    ProfileUpdate {
        /// Store failure detail.
        message: String,
    },

    /// No mirrored repository matches `(full_name, user_id)`.
    #[error("Repository not found")]
    RepositoryNotFound,

    /// A field the action needs was absent or blank.
    #[error("{0}")]
    MissingParameter(&'static str),

    /// GitHub answered the comment POST with a non-success status.
    #[error("comment rejected by GitHub: {message}")]
    CommentRejected {
        /// GitHub's failure detail.
        message: String,
    },

    /// The action discriminator was absent or unknown.
    #[error("Invalid action")]
    InvalidAction,

    /// Anything else: store, network, or malformed input failures.
    #[error("internal error: {message}")]
    Internal {
        /// Failure detail, logged and never returned.
        message: String,
    },
}

impl SyncError {
    /// HTTP status the failure is rendered with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Exchange { .. }
            | Self::MissingParameter(_)
            | Self::CommentRejected { .. }
            | Self::InvalidAction => StatusCode::BAD_REQUEST,
            Self::RepositoryNotFound => StatusCode::NOT_FOUND,
            Self::ProfileUpdate { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message placed in the `{error}` body.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Exchange { message } => message.clone(),
            Self::ProfileUpdate { .. } => "Failed to update profile".to_owned(),
            Self::CommentRejected { .. } => "Failed to post comment".to_owned(),
            Self::RepositoryNotFound | Self::MissingParameter(_) | Self::InvalidAction => {
                self.to_string()
            }
            Self::Internal { .. } => INTERNAL_ERROR_MESSAGE.to_owned(),
        }
    }

    /// Wraps any displayable failure as [`SyncError::Internal`].
    pub fn internal(error: impl std::fmt::Display) -> Self {
        Self::Internal {
            message: error.to_string(),
        }
    }

    /// Maps a token exchange failure. Only GitHub's own refusal is shown.
    #[must_use]
    pub fn from_exchange(error: GitHubError) -> Self {
        match error {
            GitHubError::TokenExchange { message } => Self::Exchange { message },
            other => Self::internal(other),
        }
    }

    /// Maps a comment POST failure.
    #[must_use]
    pub fn from_comment(error: GitHubError) -> Self {
        if error.is_rejection() {
            Self::CommentRejected {
                message: error.to_string(),
            }
        } else {
            Self::internal(error)
        }
    }
}

impl From<PersistenceError> for SyncError {
    fn from(error: PersistenceError) -> Self {
        Self::internal(error)
    }
}

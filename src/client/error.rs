//! Errors surfaced by the typed client.

use thiserror::Error;

/// Failures of a [`super::PilotClient`] call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// No session is signed in.
    #[error("User not authenticated")]
    NotAuthenticated,

    /// The OAuth callback did not carry a usable code.
    #[error("{0}")]
    Callback(&'static str),

    /// The service URL could not be built.
    #[error("service URL is invalid: {0}")]
    InvalidUrl(String),

    /// The request never produced a response.
    #[error("request failed: {message}")]
    Transport {
        /// reqwest error detail.
        message: String,
    },

    /// The service answered with an `{error}` body or a failure status.
    #[error("{message}")]
    Service {
        /// HTTP status code.
        status: u16,
        /// The service's `error` message.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected response: {message}")]
    Decode {
        /// serde detail.
        message: String,
    },
}

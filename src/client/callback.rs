//! Parsing of the `/github-callback` query string.

use url::Url;

use crate::github::AuthorizationCode;

/// Message shown when GitHub reports an `error` on the callback.
pub const AUTHORIZATION_DENIED: &str = "GitHub authorization was cancelled or failed";

/// Message shown when the callback carries neither `code` nor `error`.
pub const MISSING_AUTHORIZATION_CODE: &str = "No authorization code received from GitHub";

/// What GitHub sent back to the callback page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// An authorization code ready to exchange.
    Code(AuthorizationCode),
    /// The user cancelled or GitHub refused.
    Denied,
    /// No code was present.
    MissingCode,
}

impl CallbackOutcome {
    /// Reads the callback URL. An `error` parameter wins over `code`.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        let mut code = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "error" => return Self::Denied,
                "code" => code = AuthorizationCode::new(value).ok(),
                _ => {}
            }
        }
        code.map_or(Self::MissingCode, Self::Code)
    }

    /// The page message for outcomes that stop before the exchange.
    #[must_use]
    pub const fn failure_message(&self) -> Option<&'static str> {
        match self {
            Self::Code(_) => None,
            Self::Denied => Some(AUTHORIZATION_DENIED),
            Self::MissingCode => Some(MISSING_AUTHORIZATION_CODE),
        }
    }
}

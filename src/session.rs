//! Explicit session context threaded through every request.
//!
//! Authentication itself belongs to an external provider. The service only
//! needs the provider's local user id, which is wrapped here and passed by
//! value into each flow instead of being read from ambient state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Local user identifier issued by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps a user id, trimming whitespace.
    ///
    /// Returns `None` when the value is blank.
    #[must_use]
    pub fn new(value: impl AsRef<str>) -> Option<Self> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_owned()))
    }

    /// Borrow the id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The signed-in user on whose behalf a request runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: UserId,
}

impl Session {
    /// Creates a session for the given user.
    #[must_use]
    pub const fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    /// The local user id.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::UserId;

    #[rstest]
    #[case::empty("")]
    #[case::whitespace("   ")]
    fn user_id_rejects_blank_values(#[case] raw: &str) {
        assert!(UserId::new(raw).is_none(), "blank id should be rejected");
    }

    #[test]
    fn user_id_trims_surrounding_whitespace() {
        let id = UserId::new("  user-1 ").expect("id should be accepted");
        assert_eq!(id.as_str(), "user-1");
    }
}

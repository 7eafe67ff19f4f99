// SPDX-License-Identifier: MPL-2.0
//! Session records and the requests that create them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The signed-in user as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Session {
    /// Display name when set and non-blank, otherwise the email address.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(self.email.as_str())
    }
}

/// Cached auth state exposed to views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub session: Option<Session>,
    /// True while the initial session fetch or an auth call is in flight.
    pub loading: bool,
}

/// Change notifications pushed by the identity service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(Session),
    SignedOut,
    UserUpdated(Session),
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

impl fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("display_name", &self.display_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_prefers_display_name() {
        let mut session = Session {
            user_id: "u1".into(),
            email: "ravi@example.com".into(),
            display_name: Some("Ravi".into()),
        };
        assert_eq!(session.label(), "Ravi");

        session.display_name = Some("   ".into());
        assert_eq!(session.label(), "ravi@example.com");

        session.display_name = None;
        assert_eq!(session.label(), "ravi@example.com");
    }

    #[test]
    fn debug_output_hides_passwords() {
        let credentials = Credentials::new("a@b.c", "hunter22");
        assert!(!format!("{credentials:?}").contains("hunter22"));

        let request = SignUpRequest {
            email: "a@b.c".into(),
            password: "hunter22".into(),
            display_name: "A".into(),
        };
        assert!(!format!("{request:?}").contains("hunter22"));
    }
}

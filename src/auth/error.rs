// SPDX-License-Identifier: MPL-2.0
use thiserror::Error;

/// Failures reported by the identity service.
///
/// These are shown to the user as notifications; none of them is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("an account with this email already exists")]
    AccountExists,

    /// Sign-up succeeded but the service wants the address confirmed first.
    #[error("email confirmation required")]
    EmailConfirmationRequired,

    #[error("rejected: {0}")]
    Rejected(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl AuthError {
    /// Returns the i18n message key for this error type.
    pub fn i18n_key(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalidCredentials",
            AuthError::AccountExists => "accountExists",
            AuthError::EmailConfirmationRequired => "confirmEmail",
            AuthError::Rejected(_) => "authRejected",
            AuthError::Network(_) => "networkError",
            AuthError::UnexpectedResponse(_) => "unexpectedResponse",
        }
    }
}

// SPDX-License-Identifier: MPL-2.0
//! Login and signup form state with presentation-layer validation.
//!
//! Validation runs before any call to the identity service; a rejected form
//! never reaches it.

use thiserror::Error;

use crate::auth::{Credentials, SignUpRequest};

/// Shortest password accepted by the signup form, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("required field is empty: {0}")]
    MissingField(Field),

    #[error("password must be at least {} characters", MIN_PASSWORD_LEN)]
    PasswordTooShort,

    #[error("passwords do not match")]
    PasswordMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Password,
    ConfirmPassword,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Password => "password",
            Field::ConfirmPassword => "confirm password",
        };
        f.write_str(name)
    }
}

impl FormError {
    /// Returns the i18n message key for this error type.
    pub fn i18n_key(&self) -> &'static str {
        match self {
            FormError::MissingField(_) => "missingField",
            FormError::PasswordTooShort => "passwordTooShort",
            FormError::PasswordMismatch => "passwordMismatch",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<Credentials, FormError> {
        let email = required(&self.email, Field::Email)?;
        if self.password.is_empty() {
            return Err(FormError::MissingField(Field::Password));
        }
        Ok(Credentials::new(email, self.password.clone()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    /// Checks, in order: required fields, password length, confirmation.
    pub fn validate(&self) -> Result<SignUpRequest, FormError> {
        let name = required(&self.name, Field::Name)?;
        let email = required(&self.email, Field::Email)?;
        if self.password.is_empty() {
            return Err(FormError::MissingField(Field::Password));
        }
        if self.confirm_password.is_empty() {
            return Err(FormError::MissingField(Field::ConfirmPassword));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(FormError::PasswordTooShort);
        }
        if self.password != self.confirm_password {
            return Err(FormError::PasswordMismatch);
        }
        Ok(SignUpRequest {
            email: email.to_string(),
            password: self.password.clone(),
            display_name: name.to_string(),
        })
    }
}

fn required(value: &str, field: Field) -> Result<&str, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(FormError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}

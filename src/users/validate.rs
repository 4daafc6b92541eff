use super::types::{LoginRequest, SignupRequest};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

pub const MUST_NOT_BE_EMPTY: &str = "Must not be empty";
pub const MUST_BE_VALID_EMAIL: &str = "Must be a valid email";
pub const PASSWORDS_MUST_MATCH: &str = "Passwords must match";

/// Field name to message. Empty means the input is valid.
#[derive(ToSchema, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field`, replacing an earlier message.
    pub fn insert(&mut self, field: &str, message: &str) {
        self.0.insert(field.to_string(), message.to_string());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

/// Blank after trimming whitespace.
#[must_use]
pub fn is_empty(value: &str) -> bool {
    value.trim().is_empty()
}

#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .is_ok_and(|re| re.is_match(email))
}

#[must_use]
pub fn validate_signup(request: &SignupRequest) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if is_empty(&request.email) {
        errors.insert("email", MUST_NOT_BE_EMPTY);
    } else if !valid_email(&request.email) {
        errors.insert("email", MUST_BE_VALID_EMAIL);
    }

    if is_empty(&request.password) {
        errors.insert("password", MUST_NOT_BE_EMPTY);
    }

    // checked even when the password itself is empty
    if request.password != request.confirm_password {
        errors.insert("confirmPassword", PASSWORDS_MUST_MATCH);
    }

    if is_empty(&request.handle) {
        errors.insert("handle", MUST_NOT_BE_EMPTY);
    }

    errors
}

#[must_use]
pub fn validate_login(request: &LoginRequest) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if is_empty(&request.email) {
        errors.insert("email", MUST_NOT_BE_EMPTY);
    }

    if is_empty(&request.password) {
        errors.insert("password", MUST_NOT_BE_EMPTY);
    }

    errors
}

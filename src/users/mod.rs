//! Signup and login request flow.
//!
//! [`Users`] validates input, talks to the injected identity provider and
//! document store one call at a time, and reduces every failure to a
//! [`UserError`] the HTTP layer can render.

mod login;
mod signup;
pub mod types;
pub mod validate;


pub use self::types::{LoginRequest, LoginResponse, SignupRequest, SignupResponse, UserProfile};
pub use self::validate::{ValidationErrors, validate_login, validate_signup};

use crate::{identity::IdentityProvider, store::DocumentStore};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use mockable::Clock;
use serde_json::{Map, Value, json};
use std::{fmt, sync::Arc};
use thiserror::Error;

pub const HANDLE_TAKEN: &str = "This handle is already taken.";
pub const EMAIL_IN_USE: &str = "Email is already in use";
pub const INCORRECT_PASSWORD: &str = "Incorrect password, please try again";
pub const SIGNUP_FAILED: &str = "Could not create new user";
pub const LOGIN_FAILED: &str = "Could not login";

/// Store path of the profile for `handle`.
#[must_use]
pub fn user_path(handle: &str) -> String {
    format!("/users/{handle}")
}

#[derive(Debug, Error)]
pub enum UserError {
    /// Input is missing or malformed, one message per field.
    #[error("invalid input")]
    Validation(ValidationErrors),
    /// Handle or email already belongs to someone else.
    #[error("{field}: {message}")]
    Conflict {
        field: &'static str,
        message: &'static str,
    },
    /// Identity provider rejected the password.
    #[error("incorrect password")]
    AuthRejected,
    /// Any other identity provider or document store failure.
    #[error("({code}) {context}")]
    Upstream { code: String, context: &'static str },
}

impl UserError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Conflict { .. } => StatusCode::BAD_REQUEST,
            Self::AuthRejected => StatusCode::FORBIDDEN,
            Self::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn body(&self) -> Value {
        match self {
            Self::Validation(errors) => json!(errors),
            Self::Conflict { field, message } => {
                let mut body = Map::new();
                body.insert((*field).to_string(), Value::from(*message));
                Value::Object(body)
            }
            Self::AuthRejected => json!({ "general": INCORRECT_PASSWORD }),
            Self::Upstream { .. } => json!({ "error": self.to_string() }),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

/// Signup and login over injected collaborators.
#[derive(Clone)]
pub struct Users {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl Users {
    #[must_use]
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            identity,
            store,
            clock,
        }
    }
}

impl fmt::Debug for Users {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Users").finish_non_exhaustive()
    }
}

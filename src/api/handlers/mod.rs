//! Route handlers and the helpers they share.

pub mod health;
pub mod login;
pub mod signup;

use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;
use utoipa::ToSchema;

pub const INVALID_BODY: &str = "Invalid request body";

/// `{"general": "..."}`, used for wrong passwords and unreadable bodies.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct GeneralError {
    general: String,
}

/// `{"error": "(<code>) <context>"}`, used for upstream failures.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UpstreamError {
    error: String,
}

/// Parse a JSON body. An empty body reads as the default request so every
/// field fails its presence check.
pub(crate) fn parse_body<T>(body: &Bytes) -> Result<T, Response>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(body).map_err(|e| {
        debug!("unreadable request body: {}", e);

        (
            StatusCode::BAD_REQUEST,
            Json(GeneralError {
                general: INVALID_BODY.to_string(),
            }),
        )
            .into_response()
    })
}

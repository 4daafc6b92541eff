use super::{UpstreamError, parse_body};
use crate::users::{SignupRequest, SignupResponse, Users, ValidationErrors};
use axum::{
    body::Bytes,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::instrument;

#[utoipa::path(
    post,
    path= "/signup",
    request_body = SignupRequest,
    responses (
        (status = 201, description = "User created", body = SignupResponse, content_type = "application/json"),
        (status = 400, description = "Invalid input, handle already taken or email already in use", body = ValidationErrors),
        (status = 500, description = "Identity provider or document store failure", body = UpstreamError),
    ),
    tag= "users"
)]
#[instrument(skip(users, body))]
pub async fn signup(users: Extension<Arc<Users>>, body: Bytes) -> Response {
    let request: SignupRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match users.signup(&request).await {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

use super::{GeneralError, UpstreamError, parse_body};
use crate::users::{LoginRequest, LoginResponse, Users, ValidationErrors};
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
    path= "/login",
    request_body = LoginRequest,
    responses (
        (status = 200, description = "Login successful", body = LoginResponse, content_type = "application/json"),
        (status = 400, description = "Missing email or password", body = ValidationErrors),
        (status = 403, description = "Incorrect password", body = GeneralError),
        (status = 500, description = "Identity provider failure", body = UpstreamError),
    ),
    tag= "users"
)]
#[instrument(skip(users, body))]
pub async fn login(users: Extension<Arc<Users>>, body: Bytes) -> Response {
    let request: LoginRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match users.login(&request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

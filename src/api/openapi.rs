use super::handlers::{GeneralError, UpstreamError, health, login, signup};
use crate::users::{
    LoginRequest, LoginResponse, SignupRequest, SignupResponse, UserProfile, ValidationErrors,
};
use utoipa::OpenApi;

/// Title, version, license and contact come from the Cargo manifest.
#[derive(OpenApi)]
#[openapi(
    paths(signup::signup, login::login, health::health),
    components(schemas(
        SignupRequest,
        SignupResponse,
        LoginRequest,
        LoginResponse,
        UserProfile,
        ValidationErrors,
        GeneralError,
        UpstreamError,
        health::Health,
    )),
    tags(
        (name = "users", description = "Signup and login"),
        (name = "health", description = "Service status"),
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

use crate::users::Users;
use anyhow::Result;
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, error, info, info_span};
use ulid::Ulid;
use utoipa_swagger_ui::SwaggerUi;

pub mod handlers;
mod openapi;

pub use openapi::openapi;

const REQUEST_ID: &str = "x-request-id";

/// Build the application router around `users`.
pub fn router(users: Arc<Users>) -> Router {
    Router::new()
        .route("/signup", post(handlers::signup::signup))
        .route("/login", post(handlers::login::login))
        .route(
            "/health",
            get(handlers::health::health).options(handlers::health::health),
        )
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static(REQUEST_ID),
                    |_req: &Request<Body>| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    REQUEST_ID,
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(users)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to bind the port or serve requests
pub async fn new(port: u16, users: Arc<Users>) -> Result<()> {
    let app = router(users);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }

    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID)
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{identity::MemoryIdentity, store::MemoryStore};
    use anyhow::Result;
    use axum::{
        body::to_bytes,
        http::{StatusCode, header::CONTENT_TYPE},
        response::Response,
    };
    use mockable::DefaultClock;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app() -> Router {
        let users = Users::new(
            Arc::new(MemoryIdentity::new()),
            Arc::new(MemoryStore::new()),
            Arc::new(DefaultClock),
        );
        router(Arc::new(users))
    }

    fn post_json(uri: &str, body: &str) -> Result<Request<Body>> {
        Ok(Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))?)
    }

    async fn json_body(response: Response) -> Result<Value> {
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn alice() -> String {
        json!({
            "email": "a@b.com",
            "password": "secret1",
            "confirmPassword": "secret1",
            "handle": "alice"
        })
        .to_string()
    }

    #[tokio::test]
    async fn signup_then_login() -> Result<()> {
        let app = app();

        let response = app.clone().oneshot(post_json("/signup", &alice())?).await?;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await?;
        assert!(body["userToken"].as_str().is_some_and(|t| !t.is_empty()));

        let response = app.clone().oneshot(post_json("/signup", &alice())?).await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await?,
            json!({ "handle": "This handle is already taken." })
        );

        let login = json!({ "email": "a@b.com", "password": "secret1" }).to_string();
        let response = app.clone().oneshot(post_json("/login", &login)?).await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await?;
        assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));

        let wrong = json!({ "email": "a@b.com", "password": "wrong" }).to_string();
        let response = app.oneshot(post_json("/login", &wrong)?).await?;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            json_body(response).await?,
            json!({ "general": "Incorrect password, please try again" })
        );
        Ok(())
    }

    #[tokio::test]
    async fn signup_without_body_reports_every_field() -> Result<()> {
        let request = Request::builder()
            .method("POST")
            .uri("/signup")
            .body(Body::empty())?;
        let response = app().oneshot(request).await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await?,
            json!({
                "email": "Must not be empty",
                "password": "Must not be empty",
                "handle": "Must not be empty"
            })
        );
        Ok(())
    }

    #[tokio::test]
    async fn login_with_malformed_body() -> Result<()> {
        let response = app().oneshot(post_json("/login", "{email")?).await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await?,
            json!({ "general": "Invalid request body" })
        );
        Ok(())
    }

    #[tokio::test]
    async fn health_reports_build_and_request_id() -> Result<()> {
        let request = Request::builder()
            .uri("/health")
            .header(REQUEST_ID, "req-1")
            .body(Body::empty())?;
        let response = app().oneshot(request).await?;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(REQUEST_ID).map(HeaderValue::as_bytes),
            Some(&b"req-1"[..])
        );
        assert!(response.headers().contains_key("X-App"));

        let body = json_body(response).await?;
        assert_eq!(body["name"], env!("CARGO_PKG_NAME"));
        Ok(())
    }

    #[tokio::test]
    async fn request_id_is_generated() -> Result<()> {
        let request = Request::builder().uri("/health").body(Body::empty())?;
        let response = app().oneshot(request).await?;
        let generated = response
            .headers()
            .get(REQUEST_ID)
            .and_then(|value| value.to_str().ok())
            .map(Ulid::from_string);
        assert!(matches!(generated, Some(Ok(_))));
        Ok(())
    }
}

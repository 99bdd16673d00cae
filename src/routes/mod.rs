pub mod auth;
pub mod health;
pub mod home;
pub mod jobs;
pub mod metrics;

use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::app_state::AppState;
use crate::services::backend::Backend;
use crate::services::session::Session;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// All routes, with state applied. Middleware layers are added by the caller.
pub fn router<B: Backend>(state: AppState<B>) -> Router {
    Router::new()
        // Static UI (embedded at compile time); it reads its own query string
        .route("/", get(|| async { Html(INDEX_HTML) }))
        .route("/jobs", get(|| async { Html(INDEX_HTML) }))
        .route("/jobs/{id}", get(|| async { Html(INDEX_HTML) }))
        .route("/health", get(health::health_check::<B>))
        .route("/metrics", get(metrics::prometheus_metrics::<B>))
        .route("/api/v1/home", get(home::home_feed::<B>))
        .route("/api/v1/home/search", get(home::home_search))
        .route("/api/v1/jobs", get(jobs::list_jobs::<B>))
        .route("/api/v1/jobs/{id}", get(jobs::get_job::<B>))
        .route("/api/v1/jobs/{id}/apply", post(jobs::apply_for_job::<B>))
        .route("/api/v1/auth/signin", post(auth::sign_in::<B>))
        .route("/api/v1/auth/signup", post(auth::sign_up::<B>))
        .route("/api/v1/auth/signout", post(auth::sign_out::<B>))
        .route("/api/v1/auth/me", get(auth::me::<B>))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Session for the request, if a valid bearer token was sent.
pub async fn request_session<B: Backend>(
    backend: &B,
    headers: &HeaderMap,
) -> Result<Option<Session>, ApiError> {
    let Some(token) = bearer_token(headers) else {
        return Ok(None);
    };
    Session::resolve(backend, token).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to resolve session");
        api_error(StatusCode::BAD_GATEWAY, "Authentication service unavailable")
    })
}

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::app_state::AppState;
use crate::services::backend::Backend;

/// Prometheus metrics scrape endpoint.
/// Returns metrics in Prometheus text exposition format, or 404 when no
/// recorder was installed.
pub async fn prometheus_metrics<B: Backend>(State(state): State<AppState<B>>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;
use crate::models::profile::Profile;
use crate::routes::{api_error, request_session, ApiError};
use crate::services::account::{self, AccountError, SignUpRequest};
use crate::services::backend::{AuthSession, AuthUser, Backend, Credentials};

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: AuthUser,
    pub profile: Option<Profile>,
}

fn account_error(e: AccountError) -> ApiError {
    let status = match &e {
        AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AccountError::AlreadyRegistered => StatusCode::CONFLICT,
        AccountError::CompanyRequired | AccountError::Invalid(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AccountError::Backend(err) => {
            tracing::error!(error = %err, "Auth request failed");
            return api_error(StatusCode::BAD_GATEWAY, "Authentication service unavailable");
        }
    };
    api_error(status, e.to_string())
}

/// POST /api/v1/auth/signin: email/password sign-in.
pub async fn sign_in<B: Backend>(
    State(state): State<AppState<B>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<AuthSession>, ApiError> {
    account::sign_in(state.backend.as_ref(), &credentials)
        .await
        .map(Json)
        .map_err(account_error)
}

/// POST /api/v1/auth/signup: create an account and its profile.
pub async fn sign_up<B: Backend>(
    State(state): State<AppState<B>>,
    Json(request): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<AuthSession>), ApiError> {
    account::sign_up(state.backend.as_ref(), &request)
        .await
        .map(|session| (StatusCode::CREATED, Json(session)))
        .map_err(account_error)
}

/// POST /api/v1/auth/signout: revoke the bearer token.
pub async fn sign_out<B: Backend>(
    State(state): State<AppState<B>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let backend = state.backend.as_ref();
    let session = request_session(backend, &headers)
        .await?
        .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "Not signed in"))?;
    account::sign_out(backend, &session)
        .await
        .map_err(account_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me: the current session's user and profile.
pub async fn me<B: Backend>(
    State(state): State<AppState<B>>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, ApiError> {
    let session = request_session(state.backend.as_ref(), &headers)
        .await?
        .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "Not signed in"))?;

    Ok(Json(MeResponse {
        user: session.user,
        profile: session.profile,
    }))
}

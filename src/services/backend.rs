use std::future::Future;
use std::time::{Duration, Instant};

use garde::Validate;
use reqwest::header::CONTENT_RANGE;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::profile::Role;
use crate::services::postgrest::{parse_content_range_total, SelectQuery};

/// Rows returned by a select, plus the exact total when it was requested.
#[derive(Debug, Clone, Default)]
pub struct RowSet {
    pub rows: Vec<serde_json::Value>,
    pub total: Option<u64>,
}

impl RowSet {
    pub fn decode<T: DeserializeOwned>(self) -> Result<Vec<T>, BackendError> {
        self.rows
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(BackendError::Decode))
            .collect()
    }
}

/// Authenticated user as reported by the auth API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Profile details stored on the auth user at sign-up, so the `profiles`
/// row can be recreated if writing it failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// Absent after sign-up when the project requires email confirmation.
    #[serde(default)]
    pub access_token: Option<String>,
    pub user: AuthUser,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Credentials {
    #[garde(length(min = 3, max = 320))]
    pub email: String,

    #[garde(length(min = 6, max = 72))]
    pub password: String,
}

/// Row and auth operations the job board needs from its hosted backend.
pub trait Backend: Send + Sync + 'static {
    /// Run a select. `access_token` is the signed-in user's token, if any.
    fn select(
        &self,
        query: &SelectQuery,
        access_token: Option<&str>,
    ) -> impl Future<Output = Result<RowSet, BackendError>> + Send;

    /// Insert one row and return it as stored.
    fn insert(
        &self,
        table: &str,
        row: serde_json::Value,
        access_token: Option<&str>,
    ) -> impl Future<Output = Result<serde_json::Value, BackendError>> + Send;

    /// Insert one row, or merge into the row whose `on_conflict` column
    /// matches, and return it as stored.
    fn upsert(
        &self,
        table: &str,
        row: serde_json::Value,
        on_conflict: &str,
        access_token: Option<&str>,
    ) -> impl Future<Output = Result<serde_json::Value, BackendError>> + Send;

    fn sign_in(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<AuthSession, BackendError>> + Send;

    fn sign_up(
        &self,
        credentials: &Credentials,
        metadata: &UserMetadata,
    ) -> impl Future<Output = Result<AuthSession, BackendError>> + Send;

    /// Revoke the session behind `access_token`.
    fn sign_out(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Resolve an access token. `Ok(None)` when the token is not accepted.
    fn current_user(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<Option<AuthUser>, BackendError>> + Send;
}

/// Supabase REST client (PostgREST rows under `/rest/v1`, GoTrue under `/auth/v1`).
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> Result<Self, BackendError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("job-board/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }
}

impl Backend for SupabaseClient {
    async fn select(
        &self,
        query: &SelectQuery,
        access_token: Option<&str>,
    ) -> Result<RowSet, BackendError> {
        let mut request = self
            .http
            .get(self.rest_url(&query.table))
            .query(&query.to_params())
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token.unwrap_or(&self.anon_key));
        if query.count_exact {
            request = request.header("Prefer", "count=exact");
        }

        let started = Instant::now();
        let response = request.send().await;
        metrics::histogram!("backend_request_seconds").record(started.elapsed().as_secs_f64());
        let response = response?;
        if let Some(err) = unsatisfiable_range(&response) {
            return Err(err);
        }
        let response = ensure_success(response).await?;

        let total = content_range_total(&response);
        let rows: Vec<serde_json::Value> = response.json().await?;

        tracing::debug!(table = %query.table, rows = rows.len(), total = ?total, "Select completed");
        Ok(RowSet { rows, total })
    }

    async fn insert(
        &self,
        table: &str,
        row: serde_json::Value,
        access_token: Option<&str>,
    ) -> Result<serde_json::Value, BackendError> {
        let request = self
            .http
            .post(self.rest_url(table))
            .header("Prefer", "return=representation");
        self.write_row(request, table, &row, access_token).await
    }

    async fn upsert(
        &self,
        table: &str,
        row: serde_json::Value,
        on_conflict: &str,
        access_token: Option<&str>,
    ) -> Result<serde_json::Value, BackendError> {
        let request = self
            .http
            .post(self.rest_url(table))
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates,return=representation");
        self.write_row(request, table, &row, access_token).await
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, BackendError> {
        let response = self
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(credentials)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }

    async fn sign_up(
        &self,
        credentials: &Credentials,
        metadata: &UserMetadata,
    ) -> Result<AuthSession, BackendError> {
        let body = serde_json::json!({
            "email": credentials.email,
            "password": credentials.password,
            "data": metadata,
        });
        let response = self
            .http
            .post(self.auth_url("signup"))
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        // With email confirmation enabled the body is the bare user object.
        let body: serde_json::Value = response.json().await?;
        if body.get("user").is_some() {
            Ok(serde_json::from_value(body)?)
        } else {
            Ok(AuthSession {
                access_token: None,
                user: serde_json::from_value(body)?,
            })
        }
    }

    async fn current_user(&self, access_token: &str) -> Result<Option<AuthUser>, BackendError> {
        let response = self
            .http
            .get(self.auth_url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }
        let response = ensure_success(response).await?;
        Ok(Some(response.json().await?))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let response = self
            .http
            .post(self.auth_url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

impl SupabaseClient {
    /// Send a row write prepared by `insert`/`upsert` and return the stored row.
    async fn write_row(
        &self,
        request: RequestBuilder,
        table: &str,
        row: &serde_json::Value,
        access_token: Option<&str>,
    ) -> Result<serde_json::Value, BackendError> {
        let started = Instant::now();
        let response = request
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token.unwrap_or(&self.anon_key))
            .json(row)
            .send()
            .await;
        metrics::histogram!("backend_request_seconds").record(started.elapsed().as_secs_f64());
        let response = ensure_success(response?).await?;

        let mut rows: Vec<serde_json::Value> = response.json().await?;
        if rows.is_empty() {
            return Err(BackendError::EmptyResponse(table.to_string()));
        }
        Ok(rows.swap_remove(0))
    }
}

fn content_range_total(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_range_total)
}

/// PostgREST answers 416 (PGRST103) when the requested offset lies past the
/// exact count, reporting the count as `Content-Range: */N`.
fn unsatisfiable_range(response: &Response) -> Option<BackendError> {
    (response.status() == StatusCode::RANGE_NOT_SATISFIABLE).then(|| {
        BackendError::RangeNotSatisfiable {
            total: content_range_total(response),
        }
    })
}

/// Turn a non-2xx response into `BackendError::Status`, keeping the
/// backend's message when it sends one.
async fn ensure_success(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or(body);

    Err(BackendError::Status {
        status: status.as_u16(),
        message,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("HTTP request to backend failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode backend row: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Backend returned no row for insert into {0}")]
    EmptyResponse(String),

    #[error("Requested rows lie past the end of the result")]
    RangeNotSatisfiable { total: Option<u64> },
}

impl BackendError {
    /// Status code reported by the backend, if the request reached it.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            BackendError::RangeNotSatisfiable { .. } => Some(416),
            _ => None,
        }
    }
}

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::models::application::{Application, NewApplication};
use crate::models::filters::JobFilters;
use crate::models::job::{self, Job};
use crate::routes::{api_error, request_session, ApiError};
use crate::services::apply::{submit_application, ApplyError};
use crate::services::backend::Backend;
use crate::services::detail::{load_job_detail, DetailState};
use crate::services::listing::{fetch_listings, ListingState, ListingView};
use crate::services::query::LISTING_PAGE_SIZE;

#[derive(Debug, Serialize)]
pub struct ListingResponse {
    /// "ok", or "error" when the fetch failed and an empty list is shown.
    pub status: &'static str,
    #[serde(serialize_with = "job::serialize_views")]
    pub jobs: Vec<Job>,
    pub total: u64,
    pub filters: JobFilters,
    /// Canonical query string for the filters (no page, no leading `?`).
    pub query: String,
    pub pagination: PaginationResponse,
}

#[derive(Debug, Serialize)]
pub struct PaginationResponse {
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub pages: Vec<u32>,
    pub has_previous: bool,
    pub has_next: bool,
    pub visible: bool,
}

/// GET /api/v1/jobs: filtered, paginated active listings.
///
/// A page past the end is clamped to the last page and fetched again.
pub async fn list_jobs<B: Backend>(
    State(state): State<AppState<B>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<ListingResponse> {
    let backend = state.backend.as_ref();
    let mut view = ListingView::from_query_pairs(params);
    view.refresh(backend).await;

    if matches!(view.state(), ListingState::Loaded { .. })
        && view.page() > view.pagination().total_pages
    {
        let ticket = view.go_to_page(view.page());
        let result = fetch_listings(backend, &ticket.filters, ticket.page).await;
        view.complete(&ticket, result);
    }

    let pagination = view.pagination();
    let (status, jobs, total) = match view.state() {
        ListingState::Loaded { jobs, total } => ("ok", jobs.clone(), *total),
        _ => ("error", Vec::new(), 0),
    };

    Json(ListingResponse {
        status,
        jobs,
        total,
        filters: view.filters().clone(),
        query: view.query_string(),
        pagination: PaginationResponse {
            page: pagination.current_page,
            page_size: LISTING_PAGE_SIZE,
            total_pages: pagination.total_pages,
            pages: pagination.window(),
            has_previous: pagination.has_previous(),
            has_next: pagination.has_next(),
            visible: pagination.is_visible(),
        },
    })
}

/// GET /api/v1/jobs/{id}: job detail plus what the viewer may do with it.
pub async fn get_job<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<DetailState>), ApiError> {
    // A malformed id cannot match any row.
    let Ok(job_id) = id.parse::<Uuid>() else {
        return Ok((StatusCode::NOT_FOUND, Json(DetailState::NotFound)));
    };

    let backend = state.backend.as_ref();
    let session = request_session(backend, &headers).await?;
    let detail = load_job_detail(backend, job_id, session.as_ref()).await;

    let status = match &detail {
        DetailState::Loaded { .. } => StatusCode::OK,
        DetailState::NotFound => StatusCode::NOT_FOUND,
        DetailState::Failed { .. } => StatusCode::BAD_GATEWAY,
    };
    Ok((status, Json(detail)))
}

/// POST /api/v1/jobs/{id}/apply: submit an application as the signed-in candidate.
pub async fn apply_for_job<B: Backend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<NewApplication>,
) -> Result<(StatusCode, Json<Application>), ApiError> {
    let job_id = id
        .parse::<Uuid>()
        .map_err(|_| api_error(StatusCode::NOT_FOUND, "Job not found"))?;

    let backend = state.backend.as_ref();
    let session = request_session(backend, &headers).await?;

    match submit_application(backend, session.as_ref(), job_id, &body).await {
        Ok(application) => Ok((StatusCode::CREATED, Json(application))),
        Err(e) => {
            let status = match &e {
                ApplyError::SignInRequired => StatusCode::UNAUTHORIZED,
                ApplyError::NotCandidate => StatusCode::FORBIDDEN,
                ApplyError::JobNotFound(_) => StatusCode::NOT_FOUND,
                ApplyError::AlreadyApplied => StatusCode::CONFLICT,
                ApplyError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ApplyError::Backend(err) => {
                    tracing::error!(error = %err, %job_id, "Application submission failed");
                    return Err(api_error(
                        StatusCode::BAD_GATEWAY,
                        "Could not submit application, please try again",
                    ));
                }
            };
            Err(api_error(status, e.to_string()))
        }
    }
}

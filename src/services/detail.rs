use serde::Serialize;
use uuid::Uuid;

use crate::models::application::ApplicationRef;
use crate::models::job::{self, Job};
use crate::models::profile::Role;
use crate::services::backend::{Backend, BackendError};
use crate::services::query::{job_detail_query, prior_application_query};
use crate::services::session::Session;

/// What the viewer may do with the job they are looking at.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApplyState {
    /// Nobody is signed in.
    SignInRequired,
    /// Signed-in candidate with no application on record.
    CanApply,
    /// Signed-in candidate who already applied; the apply action is hidden.
    AlreadyApplied,
    /// The prior-application lookup failed. Applying stays enabled and the
    /// backend's uniqueness constraint decides.
    CheckFailed,
    /// Employer who posted this job.
    CanEdit,
    /// Signed in, but not as a candidate.
    NotCandidate,
}

impl ApplyState {
    pub fn allows_apply(&self) -> bool {
        matches!(self, ApplyState::CanApply | ApplyState::CheckFailed)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DetailState {
    NotFound,
    Failed {
        message: String,
    },
    Loaded {
        #[serde(serialize_with = "job::serialize_view")]
        job: Box<Job>,
        apply: ApplyState,
        /// Whether the apply form is offered.
        can_apply: bool,
    },
}

/// Single active job by id. `Ok(None)` when it does not exist or is not active.
pub async fn fetch_job<B: Backend>(
    backend: &B,
    job_id: Uuid,
    access_token: Option<&str>,
) -> Result<Option<Job>, BackendError> {
    let rows = backend.select(&job_detail_query(job_id), access_token).await?;
    Ok(rows.decode::<Job>()?.into_iter().next())
}

/// Whether the session's user already has an application for `job_id`.
/// Advisory only.
pub async fn has_applied<B: Backend>(
    backend: &B,
    job_id: Uuid,
    session: &Session,
) -> Result<bool, BackendError> {
    let query = prior_application_query(job_id, session.user_id());
    let rows = backend.select(&query, Some(&session.access_token)).await?;
    Ok(!rows.decode::<ApplicationRef>()?.is_empty())
}

/// Load the detail view. Always ends in a terminal state.
pub async fn load_job_detail<B: Backend>(
    backend: &B,
    job_id: Uuid,
    session: Option<&Session>,
) -> DetailState {
    let token = session.map(|s| s.access_token.as_str());
    let job = match fetch_job(backend, job_id, token).await {
        Ok(Some(job)) => job,
        Ok(None) => return DetailState::NotFound,
        Err(e) => {
            tracing::error!(error = %e, %job_id, "Error fetching job");
            return DetailState::Failed {
                message: e.to_string(),
            };
        }
    };

    let apply = viewer_apply_state(backend, &job, session).await;
    DetailState::Loaded {
        job: Box::new(job),
        apply,
        can_apply: apply.allows_apply(),
    }
}

async fn viewer_apply_state<B: Backend>(
    backend: &B,
    job: &Job,
    session: Option<&Session>,
) -> ApplyState {
    let Some(session) = session else {
        return ApplyState::SignInRequired;
    };

    match session.role() {
        Some(Role::Candidate) => match has_applied(backend, job.id, session).await {
            Ok(true) => ApplyState::AlreadyApplied,
            Ok(false) => ApplyState::CanApply,
            Err(e) => {
                tracing::warn!(error = %e, job_id = %job.id, "Prior application check failed");
                ApplyState::CheckFailed
            }
        },
        Some(Role::Employer) if job.employer_id == session.user_id() => ApplyState::CanEdit,
        _ => ApplyState::NotCandidate,
    }
}

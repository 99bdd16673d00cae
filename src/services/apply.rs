use garde::Validate;
use uuid::Uuid;

use crate::models::application::{Application, ApplicationInsert, ApplicationStatus, NewApplication};
use crate::services::backend::{Backend, BackendError};
use crate::services::detail::{fetch_job, has_applied};
use crate::services::query::APPLICATIONS_TABLE;
use crate::services::session::Session;

/// Submit a candidate's application for an active job.
///
/// The role and duplicate checks here only spare the user a round-trip; the
/// backend's row policies and unique constraint are authoritative.
pub async fn submit_application<B: Backend>(
    backend: &B,
    session: Option<&Session>,
    job_id: Uuid,
    application: &NewApplication,
) -> Result<Application, ApplyError> {
    let session = session.ok_or(ApplyError::SignInRequired)?;
    if !session.is_candidate() {
        return Err(ApplyError::NotCandidate);
    }
    application.validate()?;

    let token = Some(session.access_token.as_str());
    if fetch_job(backend, job_id, token).await?.is_none() {
        return Err(ApplyError::JobNotFound(job_id));
    }
    if has_applied(backend, job_id, session).await? {
        return Err(ApplyError::AlreadyApplied);
    }

    let row = serde_json::to_value(ApplicationInsert {
        job_id,
        candidate_id: session.user_id(),
        cover_letter: &application.cover_letter,
        resume_url: &application.resume_url,
        status: ApplicationStatus::Pending,
    })
    .map_err(BackendError::Decode)?;

    let created = match backend.insert(APPLICATIONS_TABLE, row, token).await {
        Ok(created) => created,
        // 23505 unique_violation surfaces from PostgREST as 409
        Err(e) if e.status() == Some(409) => return Err(ApplyError::AlreadyApplied),
        Err(e) => return Err(e.into()),
    };
    let application: Application =
        serde_json::from_value(created).map_err(BackendError::Decode)?;

    metrics::counter!("applications_submitted_total").increment(1);
    tracing::info!(application_id = %application.id, %job_id, "Application submitted");
    Ok(application)
}

#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error("Sign in to apply")]
    SignInRequired,

    #[error("Only candidates can apply for jobs")]
    NotCandidate,

    #[error("Job {0} not found")]
    JobNotFound(Uuid),

    #[error("You have already applied for this job")]
    AlreadyApplied,

    #[error("Invalid application: {0}")]
    Invalid(#[from] garde::Report),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Review state of an application.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Rejected,
    Accepted,
}

/// A row of the `applications` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub cover_letter: String,
    pub resume_url: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Candidate-supplied part of an application.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewApplication {
    #[garde(length(min = 1, max = 5000))]
    pub cover_letter: String,

    #[garde(length(min = 1, max = 2048))]
    pub resume_url: String,
}

/// Insert payload for the `applications` table.
#[derive(Debug, Serialize)]
pub struct ApplicationInsert<'a> {
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub cover_letter: &'a str,
    pub resume_url: &'a str,
    pub status: ApplicationStatus,
}

/// Projection used by the "already applied" lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationRef {
    pub id: Uuid,
}

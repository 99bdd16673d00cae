use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Candidate,
    Employer,
}

/// A row of the `profiles` table, keyed by the auth user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub email: String,
    pub role: Role,
    pub company_name: Option<String>,
    pub company_logo: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub bio: Option<String>,
    pub resume_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Upsert payload for the `profiles` row.
#[derive(Debug, Serialize)]
pub struct ProfileInsert<'a> {
    pub user_id: Uuid,
    pub email: &'a str,
    pub full_name: Option<&'a str>,
    pub role: Role,
    pub company_name: Option<&'a str>,
}

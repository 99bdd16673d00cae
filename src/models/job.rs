use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Employment type of a posting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Remote,
}

/// Seniority a posting is aimed at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Executive,
}

impl ExperienceLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "Entry Level",
            ExperienceLevel::Mid => "Mid Level",
            ExperienceLevel::Senior => "Senior Level",
            ExperienceLevel::Executive => "Executive",
        }
    }
}

/// Publication state of a posting. Only `Active` rows are ever shown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum JobStatus {
    Active,
    Closed,
    Draft,
}

/// A row of the `jobs` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub category: String,
    pub experience_level: ExperienceLevel,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub currency: String,
    pub description: String,
    pub requirements: String,
    pub benefits: Option<String>,
    pub featured: bool,
    pub status: JobStatus,
    #[serde(default)]
    pub applications_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Human-readable salary, e.g. `$90,000 - $120,000` or `$90,000+`.
    pub fn salary_label(&self) -> String {
        match (self.salary_min, self.salary_max) {
            (Some(min), Some(max)) => format!(
                "{}{} - {}{}",
                self.currency,
                group_thousands(min),
                self.currency,
                group_thousands(max)
            ),
            (Some(min), None) => format!("{}{}+", self.currency, group_thousands(min)),
            _ => "Salary not specified".to_string(),
        }
    }
}

/// A job as served to the page: the row plus its display labels.
#[derive(Debug, Serialize)]
pub struct JobView<'a> {
    #[serde(flatten)]
    pub job: &'a Job,
    pub salary_label: String,
    pub experience_label: &'static str,
}

impl Job {
    pub fn view(&self) -> JobView<'_> {
        JobView {
            job: self,
            salary_label: self.salary_label(),
            experience_label: self.experience_level.label(),
        }
    }
}

/// `serialize_with` helper that writes a job as its [`JobView`].
pub fn serialize_view<S: Serializer>(job: &Job, serializer: S) -> Result<S::Ok, S::Error> {
    job.view().serialize(serializer)
}

/// `serialize_with` helper that writes a list of jobs as [`JobView`]s.
pub fn serialize_views<S: Serializer>(jobs: &[Job], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(jobs.iter().map(Job::view))
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

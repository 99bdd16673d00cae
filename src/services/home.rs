use serde::Serialize;

use crate::models::filters::{FilterField, JobFilters};
use crate::models::job::{serialize_views, Job};
use crate::services::backend::{Backend, BackendError};
use crate::services::postgrest::SelectQuery;
use crate::services::query::{featured_jobs_query, recent_jobs_query};

/// Landing page sections.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HomeFeed {
    #[serde(serialize_with = "serialize_views")]
    pub featured: Vec<Job>,
    #[serde(serialize_with = "serialize_views")]
    pub recent: Vec<Job>,
}

/// Fetch both sections. A failing section is logged and rendered empty.
pub async fn load_home_feed<B: Backend>(backend: &B) -> HomeFeed {
    let featured_query = featured_jobs_query();
    let recent_query = recent_jobs_query();
    let (featured, recent) = tokio::join!(
        fetch_section(backend, &featured_query),
        fetch_section(backend, &recent_query),
    );

    HomeFeed {
        featured: featured.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Error fetching featured jobs");
            Vec::new()
        }),
        recent: recent.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Error fetching recent jobs");
            Vec::new()
        }),
    }
}

async fn fetch_section<B: Backend>(
    backend: &B,
    query: &SelectQuery,
) -> Result<Vec<Job>, BackendError> {
    backend.select(query, None).await?.decode()
}

/// Listing URL for a home-page search, or `None` for a blank term.
pub fn search_redirect(term: &str) -> Option<String> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }
    let mut filters = JobFilters::default();
    filters.set(FilterField::Search, term);
    Some(format!("/jobs?{}", filters.to_query_string()))
}

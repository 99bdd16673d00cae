//! Composes the backend queries behind each view.

use uuid::Uuid;

use crate::models::filters::JobFilters;
use crate::models::job::JobStatus;
use crate::services::postgrest::{Filter, RowRange, SelectQuery};

pub const JOBS_TABLE: &str = "jobs";
pub const APPLICATIONS_TABLE: &str = "applications";
pub const PROFILES_TABLE: &str = "profiles";
/// Unique column profile upserts merge on.
pub const PROFILE_KEY: &str = "user_id";

/// Rows per listing page.
pub const LISTING_PAGE_SIZE: u32 = 12;
/// Home page "featured" section size.
pub const FEATURED_LIMIT: u64 = 3;
/// Home page "recent" section size.
pub const RECENT_LIMIT: u64 = 6;

/// Columns matched by the free-text search.
const SEARCH_COLUMNS: [&str; 3] = ["title", "company", "description"];

fn active_jobs() -> SelectQuery {
    SelectQuery::table(JOBS_TABLE).eq("status", JobStatus::Active)
}

/// Listing query for the given filters and 1-based page.
///
/// Empty criteria add no predicate. Featured jobs sort first, then newest;
/// ordering among rows with equal `created_at` is left to the backend.
pub fn listing_query(filters: &JobFilters, page: u32) -> SelectQuery {
    let mut query = active_jobs().count_exact();

    if !filters.search.is_empty() {
        query = query.or(SEARCH_COLUMNS
            .iter()
            .map(|column| Filter::ilike(*column, filters.search.as_str()))
            .collect());
    }
    if !filters.location.is_empty() {
        query = query.ilike("location", filters.location.as_str());
    }
    if !filters.category.is_empty() {
        query = query.eq("category", &filters.category);
    }
    if !filters.job_type.is_empty() {
        query = query.eq("type", &filters.job_type);
    }
    if !filters.experience.is_empty() {
        query = query.eq("experience_level", &filters.experience);
    }

    query
        .order("featured", false)
        .order("created_at", false)
        .range(RowRange::for_page(page, LISTING_PAGE_SIZE))
}

pub fn featured_jobs_query() -> SelectQuery {
    active_jobs()
        .eq("featured", true)
        .order("created_at", false)
        .limit(FEATURED_LIMIT)
}

pub fn recent_jobs_query() -> SelectQuery {
    active_jobs().order("created_at", false).limit(RECENT_LIMIT)
}

/// Single active job by id.
pub fn job_detail_query(job_id: Uuid) -> SelectQuery {
    SelectQuery::table(JOBS_TABLE)
        .eq("id", job_id)
        .eq("status", JobStatus::Active)
        .limit(1)
}

/// Existence check for a candidate's application to a job.
pub fn prior_application_query(job_id: Uuid, candidate_id: Uuid) -> SelectQuery {
    SelectQuery::table(APPLICATIONS_TABLE)
        .select("id")
        .eq("job_id", job_id)
        .eq("candidate_id", candidate_id)
        .limit(1)
}

pub fn profile_query(user_id: Uuid) -> SelectQuery {
    SelectQuery::table(PROFILES_TABLE)
        .eq("user_id", user_id)
        .limit(1)
}

//! Job listing fetcher and the view state it publishes.
//!
//! Every fetch is issued under a [`FetchTicket`]. Completing a ticket that is
//! no longer the newest is a no-op, so a slow response for an old filter set
//! cannot overwrite the result of a newer one.

use serde::Serialize;

use crate::models::filters::{FilterField, JobFilters};
use crate::models::job::Job;
use crate::services::backend::{Backend, BackendError};
use crate::services::pagination::Pagination;
use crate::services::postgrest::SelectQuery;
use crate::services::query::{listing_query, LISTING_PAGE_SIZE};

/// One page of listing results.
#[derive(Debug, Clone, Serialize)]
pub struct ListingPage {
    pub jobs: Vec<Job>,
    /// Total matching rows across all pages.
    pub total: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ListingState {
    Loading,
    Loaded { jobs: Vec<Job>, total: u64 },
    Failed { message: String },
}

impl ListingState {
    /// Jobs to render. Loading and failed states render as an empty list.
    pub fn jobs(&self) -> &[Job] {
        match self {
            ListingState::Loaded { jobs, .. } => jobs,
            _ => &[],
        }
    }

    pub fn total(&self) -> u64 {
        match self {
            ListingState::Loaded { total, .. } => *total,
            _ => 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ListingState::Loading)
    }
}

/// Run the listing query for `filters` / `page`. One backend round-trip.
pub async fn fetch_listings<B: Backend>(
    backend: &B,
    filters: &JobFilters,
    page: u32,
) -> Result<ListingPage, BackendError> {
    let query = listing_query(filters, page);
    let rows = match backend.select(&query, None).await {
        Ok(rows) => rows,
        // A page past the end still reports the total, which drives clamping.
        Err(BackendError::RangeNotSatisfiable { total: Some(total) }) => {
            return Ok(ListingPage {
                jobs: Vec::new(),
                total,
            })
        }
        Err(e) => return Err(e),
    };
    let total = rows.total.unwrap_or(rows.rows.len() as u64);
    let jobs = rows.decode()?;
    Ok(ListingPage { jobs, total })
}

/// Handle for one in-flight fetch.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    generation: u64,
    pub filters: JobFilters,
    pub page: u32,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> SelectQuery {
        listing_query(&self.filters, self.page)
    }
}

/// Filter state, current page and latest result for the listing view.
#[derive(Debug, Clone)]
pub struct ListingView {
    filters: JobFilters,
    page: u32,
    state: ListingState,
    /// Total from the last successful fetch; drives page clamping.
    last_total: u64,
    generation: u64,
}

impl ListingView {
    pub fn new(filters: JobFilters, page: u32) -> Self {
        Self {
            filters,
            page: page.max(1),
            state: ListingState::Loading,
            last_total: 0,
            generation: 0,
        }
    }

    /// Initial state from URL query pairs; `page` is read from the same pairs.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut page = 1;
        let mut filter_pairs = Vec::new();
        for (key, value) in pairs {
            let value: String = value.into();
            if key.as_ref() == "page" {
                page = value.trim().parse().unwrap_or(1);
            } else {
                filter_pairs.push((key.as_ref().to_string(), value));
            }
        }
        Self::new(JobFilters::from_query_pairs(filter_pairs), page)
    }

    pub fn filters(&self) -> &JobFilters {
        &self.filters
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn state(&self) -> &ListingState {
        &self.state
    }

    /// URL query for the current filters (page excluded).
    pub fn query_string(&self) -> String {
        self.filters.to_query_string()
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.last_total, LISTING_PAGE_SIZE)
    }

    /// Change one criterion. Always returns to page 1.
    pub fn set_filter(&mut self, field: FilterField, value: impl Into<String>) -> FetchTicket {
        self.filters.set(field, value);
        self.page = 1;
        self.begin_fetch()
    }

    pub fn clear_filters(&mut self) -> FetchTicket {
        self.filters.clear();
        self.page = 1;
        self.begin_fetch()
    }

    /// Move to `page`, clamped to the pages known from the last result.
    /// Filters are kept.
    pub fn go_to_page(&mut self, page: u32) -> FetchTicket {
        self.page = self.pagination().clamp(page);
        self.begin_fetch()
    }

    /// Start a fetch for the current filters and page.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.state = ListingState::Loading;
        FetchTicket {
            generation: self.generation,
            filters: self.filters.clone(),
            page: self.page,
        }
    }

    /// Apply a fetch result. Returns `false` (and changes nothing) when the
    /// ticket has been superseded.
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<ListingPage, BackendError>,
    ) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket = ticket.generation,
                latest = self.generation,
                "Discarding stale listing response"
            );
            return false;
        }

        metrics::counter!("job_listing_fetches_total").increment(1);
        self.state = match result {
            Ok(page) => {
                self.last_total = page.total;
                ListingState::Loaded {
                    jobs: page.jobs,
                    total: page.total,
                }
            }
            Err(e) => {
                metrics::counter!("job_listing_fetch_failures_total").increment(1);
                tracing::error!(error = %e, page = ticket.page, "Error fetching jobs");
                ListingState::Failed {
                    message: e.to_string(),
                }
            }
        };
        true
    }

    /// Fetch the current filters and page and apply the result.
    pub async fn refresh<B: Backend>(&mut self, backend: &B) {
        let ticket = self.begin_fetch();
        let result = fetch_listings(backend, &ticket.filters, ticket.page).await;
        self.complete(&ticket, result);
    }
}

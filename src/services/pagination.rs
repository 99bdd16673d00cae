use serde::Serialize;

/// Maximum number of page links shown at once.
const WINDOW_SIZE: u32 = 5;

/// Total pages for a row count; never less than one.
pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    let size = u64::from(page_size.max(1));
    let pages = total_count.div_ceil(size).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Page navigation state derived from the backend's total count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
}

impl Pagination {
    /// `requested` is clamped into `[1, total_pages]`.
    pub fn new(requested: u32, total_count: u64, page_size: u32) -> Self {
        let total_pages = total_pages(total_count, page_size);
        Self {
            current_page: requested.clamp(1, total_pages),
            total_pages,
        }
    }

    pub fn clamp(&self, page: u32) -> u32 {
        page.clamp(1, self.total_pages)
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn previous(&self) -> u32 {
        self.clamp(self.current_page.saturating_sub(1))
    }

    pub fn next(&self) -> u32 {
        self.clamp(self.current_page.saturating_add(1))
    }

    /// Up to five consecutive page numbers, centred on the current page
    /// where the bounds allow.
    pub fn window(&self) -> Vec<u32> {
        let len = WINDOW_SIZE.min(self.total_pages);
        let last_start = self.total_pages.saturating_sub(WINDOW_SIZE - 1).max(1);
        let start = self.current_page.saturating_sub(2).clamp(1, last_start);
        (start..start + len).collect()
    }

    /// Controls are only rendered when there is more than one page.
    pub fn is_visible(&self) -> bool {
        self.total_pages > 1
    }
}

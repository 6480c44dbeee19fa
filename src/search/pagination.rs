//! # Pagination
//!
//! `page` / `per-page` query handling for list operations.

use std::collections::HashMap;

/// Default number of records per page
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Upper bound on page size, to avoid unbounded listing
pub const MAX_PAGE_SIZE: usize = 20000;

/// Query parameter carrying the 1-based page number
pub const PAGE_PARAM: &str = "page";

/// Query parameter carrying the page size
pub const PER_PAGE_PARAM: &str = "per-page";

/// Requested page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number as requested
    pub page: usize,
    /// Records per page, clamped to `[1, max]`
    pub per_page: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Read pagination from query parameters.
    ///
    /// Unparseable values fall back to the defaults; out of range page
    /// sizes are clamped rather than rejected.
    pub fn from_query(query: &HashMap<String, String>, default_size: usize, max_size: usize) -> Self {
        let max_size = max_size.max(1);
        let per_page = query
            .get(PER_PAGE_PARAM)
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(default_size)
            .clamp(1, max_size);
        let page = query
            .get(PAGE_PARAM)
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1)
            .max(1);

        Self { page, per_page }
    }

    /// Number of pages for a total record count
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.per_page)
    }

    /// Page actually served: the requested page clamped to the last page
    pub fn effective_page(&self, total: usize) -> usize {
        self.page.min(self.page_count(total)).max(1)
    }

    /// Records to skip for the page as requested, before the total is known
    pub fn requested_offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Records to skip
    pub fn offset(&self, total: usize) -> usize {
        (self.effective_page(total) - 1) * self.per_page
    }

    /// Pagination headers for a list response
    pub fn headers(&self, total: usize) -> Vec<(&'static str, String)> {
        vec![
            ("X-Pagination-Total-Count", total.to_string()),
            ("X-Pagination-Page-Count", self.page_count(total).to_string()),
            (
                "X-Pagination-Current-Page",
                self.effective_page(total).to_string(),
            ),
            ("X-Pagination-Per-Page", self.per_page.to_string()),
        ]
    }
}

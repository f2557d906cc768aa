//! This module defines the common functionality for paging data.

use serde::Serialize;

/// The config for pagination.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of transactions per page when not specified in a request.
    pub default_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
        }
    }
}

/// The pagination metadata returned alongside a page of transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// The number of records matching the query across all pages.
    pub total: u64,
    /// The requested page number (1-based).
    pub page: u64,
    /// The maximum number of records per page.
    pub limit: u64,
    /// The number of pages needed to show all matching records.
    pub total_pages: u64,
}

impl Pagination {
    /// Create the pagination metadata for `total` records split into pages
    /// of `limit`.
    pub fn new(total: u64, page: u64, limit: u64) -> Self {
        Self {
            total,
            page,
            limit,
            total_pages: total_page_count(total, limit),
        }
    }
}

/// The number of pages needed to display `total` records with `limit`
/// records per page, i.e. `ceil(total / limit)`.
pub(crate) fn total_page_count(total: u64, limit: u64) -> u64 {
    total.div_ceil(limit.max(1))
}

//! Pagination types for list operations.

use serde::{Deserialize, Serialize};

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Number of items per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Number of items to skip.
    #[serde(default)]
    pub offset: u64,
}

fn default_page_size() -> u32 {
    20
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            offset: 0,
        }
    }
}

impl PageRequest {
    /// Creates a request for `page_size` items starting after `offset` items.
    #[must_use]
    pub const fn new(page_size: u32, offset: u64) -> Self {
        Self { page_size, offset }
    }

    /// Creates a request from a 1-indexed page number.
    #[must_use]
    pub fn from_page(page: u32, page_size: u32) -> Self {
        Self {
            page_size,
            offset: u64::from(page.saturating_sub(1)) * u64::from(page_size),
        }
    }

    /// Returns true if the page size is within `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.page_size >= 1 && self.page_size <= MAX_PAGE_SIZE
    }

    /// Returns the limit for database queries.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

/// Response wrapper for paginated data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items in the current page.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PageMeta,
}

/// Pagination metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Items per page.
    pub page_size: u32,
    /// Items skipped before this page.
    pub offset: u64,
    /// Total number of items across all pages.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

impl<T> PageResponse<T> {
    /// Creates a new paginated response.
    #[must_use]
    pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        let total_pages = if total == 0 || request.page_size == 0 {
            1
        } else {
            total.div_ceil(u64::from(request.page_size))
        };

        Self {
            data,
            meta: PageMeta {
                page_size: request.page_size,
                offset: request.offset,
                total,
                total_pages,
            },
        }
    }

    /// Returns true if more items exist after this page.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.meta.offset + (self.data.len() as u64) < self.meta.total
    }
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod tests;

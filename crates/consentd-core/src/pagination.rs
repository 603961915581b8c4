//! Offset pagination for the event audit view.

use serde::{Deserialize, Serialize};

const DEFAULT_LIMIT: u32 = 20;

/// A validated page request. Page and limit are both 1-based and clamped
/// to a minimum of 1; the limit defaults to 20 when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Creates a page request, applying defaults and minimum clamps.
    ///
    /// # Example
    ///
    /// ```
    /// use consentd_core::PageRequest;
    ///
    /// let page = PageRequest::new(Some(2), None);
    /// assert_eq!(page.page(), 2);
    /// assert_eq!(page.limit(), 20);
    /// assert_eq!(page.offset(), 20);
    /// ```
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).max(1),
        }
    }

    /// Returns the 1-based page number.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Returns the page size.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns the number of rows to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Pagination metadata returned alongside a page of rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageMeta {
    /// Builds metadata for a page. `total_pages` is never below 1, even for
    /// an empty result set.
    ///
    /// # Example
    ///
    /// ```
    /// use consentd_core::PageMeta;
    ///
    /// let meta = PageMeta::build(25, 2, 20);
    /// assert_eq!(meta.total_pages, 2);
    /// assert!(!meta.has_next);
    /// assert!(meta.has_prev);
    /// ```
    pub fn build(total: u64, page: u32, limit: u32) -> Self {
        let total_pages = (total.div_ceil(u64::from(limit)) as u32).max(1);
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

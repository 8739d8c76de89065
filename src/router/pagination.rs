//! # Pagination Parameters
//!
//! Parses `page` and `pageSize` out of the query string. Pages are
//! zero-based; every other query parameter is ignored.

use std::collections::HashMap;

use super::errors::{RouteError, RouteResult};

/// Maximum number of records a single page can hold
pub const MAX_PAGE_SIZE: u64 = 100;

/// Page size if not specified
pub const DEFAULT_PAGE_SIZE: u64 = 20;

pub const PAGE_PARAM: &str = "page";
pub const PAGE_SIZE_PARAM: &str = "pageSize";

/// Zero-based page selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Zero-based page index
    pub page: u64,

    /// Records per page, `1..=MAX_PAGE_SIZE`
    pub page_size: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Parse pagination from a query parameter map
    pub fn parse(params: &HashMap<String, String>) -> RouteResult<Self> {
        let mut result = Pagination::default();

        if let Some(value) = params.get(PAGE_PARAM) {
            result.page = parse_count(PAGE_PARAM, value)?;
        }

        if let Some(value) = params.get(PAGE_SIZE_PARAM) {
            let size = parse_count(PAGE_SIZE_PARAM, value)?;
            if size == 0 {
                return Err(RouteError::InvalidPagination(
                    "pageSize must be at least 1".to_string(),
                ));
            }
            // Oversized pages are clamped, not rejected
            result.page_size = size.min(MAX_PAGE_SIZE);
        }

        result.offset()?;
        Ok(result)
    }

    /// Number of records to return
    pub fn limit(&self) -> i64 {
        // page_size never exceeds MAX_PAGE_SIZE
        self.page_size as i64
    }

    /// Number of records to skip, bounded so it binds as a signed 64-bit value
    pub fn offset(&self) -> RouteResult<i64> {
        self.page
            .checked_mul(self.page_size)
            .and_then(|offset| i64::try_from(offset).ok())
            .ok_or_else(|| {
                RouteError::InvalidPagination(format!("page {} is out of range", self.page))
            })
    }
}

fn parse_count(name: &str, value: &str) -> RouteResult<u64> {
    value.trim().parse().map_err(|_| {
        RouteError::InvalidPagination(format!(
            "{} must be a non-negative integer, got '{}'",
            name, value
        ))
    })
}

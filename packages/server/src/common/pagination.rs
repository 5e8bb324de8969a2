//! Offset pagination for the family feed.
//!
//! Query strings carry `page` (1-based) and `limit`; responses report
//! `totalPages`, `currentPage` and `total` alongside the items.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Raw pagination query parameters (`?page=2&limit=10`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    /// Apply defaults and bounds: page >= 1, limit in 1..=100 (default 20).
    pub fn validate(&self) -> PageRequest {
        PageRequest {
            page: self.page.unwrap_or(1).max(1),
            limit: self
                .limit
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }
}

/// Validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Self {
        PageQuery {
            page: Some(page),
            limit: Some(limit),
        }
        .validate()
    }

    /// SQL OFFSET for this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(skip)]
    pub items: Vec<T>,
    pub total_pages: i64,
    pub current_page: i64,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total_pages: total_pages(total, request.limit),
            current_page: request.page,
            total,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_pages: self.total_pages,
            current_page: self.current_page,
            total: self.total,
        }
    }
}

fn total_pages(total: i64, limit: i64) -> i64 {
    if total <= 0 {
        0
    } else {
        (total + limit - 1) / limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = PageQuery::default().validate();
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, 20);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn test_clamps() {
        let request = PageRequest::new(0, 500);
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, 100);

        let request = PageRequest::new(3, 0);
        assert_eq!(request.limit, 1);
        assert_eq!(request.offset(), 2);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = Page::new(vec![1, 2], 41, PageRequest::new(1, 20));
        assert_eq!(page.total_pages, 3);
        let empty: Page<i32> = Page::new(vec![], 0, PageRequest::new(1, 20));
        assert_eq!(empty.total_pages, 0);
    }
}

//! Page/limit pagination used by the list endpoints

use serde::Serialize;

const DEFAULT_LIMIT: u64 = 10;
const MAX_LIMIT: u64 = 100;
/// Keeps `offset()` well inside `i64` for the SQL `OFFSET` bind
const MAX_PAGE: u64 = 1_000_000;

/// Normalised page request (1-based page)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, MAX_PAGE),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Pagination block of the response envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u64,
}

impl Pagination {
    pub fn new(page: u64, limit: u64, total_items: u64) -> Self {
        Self {
            current_page: page,
            total_pages: total_items.div_ceil(limit.max(1)),
            total_items,
            items_per_page: limit,
        }
    }

    pub fn for_request(request: &PageRequest, total_items: u64) -> Self {
        Self::new(request.page, request.limit, total_items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_normalisation() {
        let request = PageRequest::new(None, None);
        assert_eq!((request.page, request.limit, request.offset()), (1, 10, 0));

        let request = PageRequest::new(Some(0), Some(500));
        assert_eq!((request.page, request.limit), (1, 100));

        let request = PageRequest::new(Some(3), Some(20));
        assert_eq!(request.offset(), 40);
    }

    #[test]
    fn test_huge_page_is_capped() {
        let request = PageRequest::new(Some(u64::MAX), Some(100));
        assert_eq!(request.page, MAX_PAGE);
        assert_eq!(request.offset(), (MAX_PAGE - 1) * 100);
        assert!(i64::try_from(request.offset()).is_ok());
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 10, 10).total_pages, 1);
        assert_eq!(Pagination::new(2, 10, 11).total_pages, 2);
    }
}

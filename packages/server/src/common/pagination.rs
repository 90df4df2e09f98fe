//! Page-number pagination types.
//!
//! List endpoints page through results with a 1-based page number and a
//! fixed page size chosen per collection. Responses carry the total row
//! count and total page count so clients can render pagers without a
//! second query.
//!
//! # Usage
//!
//! ```rust,ignore
//! let request = PageRequest::new(query.page, 10);
//! let (items, total) = store.search_contacts(owner, &filter, &request).await?;
//! let page = Page::new(items, &request, total);
//! ```

// ============================================================================
// PageRequest
// ============================================================================

/// A validated request for one page of results.
///
/// Page numbers below 1 are clamped to 1; out-of-range pages are allowed
/// and simply yield an empty item list with correct totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    page_size: i64,
}

impl PageRequest {
    /// Create a page request, clamping the page number to at least 1.
    pub fn new(page: Option<i64>, page_size: i64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.max(1),
        }
    }

    /// 1-based page number.
    pub fn page(&self) -> i64 {
        self.page
    }

    /// Number of items per page.
    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Number of rows to skip before this page starts.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    /// Maximum number of rows on this page.
    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

// ============================================================================
// Page
// ============================================================================

/// One page of results plus the counts needed to render a pager.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    /// Assemble a page from fetched items and the total row count.
    pub fn new(items: Vec<T>, request: &PageRequest, total: i64) -> Self {
        Self {
            items,
            page: request.page(),
            page_size: request.page_size(),
            total,
            total_pages: total_pages(total, request.page_size()),
        }
    }

    /// An empty page (no matching rows).
    pub fn empty(request: &PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }
}

/// Ceiling division of `total` by `page_size`.
fn total_pages(total: i64, page_size: i64) -> i64 {
    if total == 0 {
        0
    } else {
        (total + page_size - 1) / page_size
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_to_one() {
        let request = PageRequest::new(None, 10);
        assert_eq!(request.page(), 1);
        assert_eq!(request.offset(), 0);
        assert_eq!(request.limit(), 10);
    }

    #[test]
    fn test_page_clamps_below_one() {
        assert_eq!(PageRequest::new(Some(0), 10).page(), 1);
        assert_eq!(PageRequest::new(Some(-5), 10).page(), 1);
    }

    #[test]
    fn test_offset_math() {
        let request = PageRequest::new(Some(3), 10);
        assert_eq!(request.offset(), 20);
        assert_eq!(request.limit(), 10);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let request = PageRequest::new(Some(1), 10);
        assert_eq!(Page::new(vec![1], &request, 25).total_pages, 3);
        assert_eq!(Page::new(vec![1], &request, 30).total_pages, 3);
        assert_eq!(Page::new(vec![1], &request, 31).total_pages, 4);
        assert_eq!(Page::new(vec![1], &request, 1).total_pages, 1);
    }

    #[test]
    fn test_empty_page() {
        let request = PageRequest::new(Some(99), 10);
        let page: Page<i32> = Page::empty(&request);
        assert!(page.items.is_empty());
        assert_eq!(page.page, 99);
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_out_of_range_page_keeps_totals() {
        let request = PageRequest::new(Some(99), 10);
        let page: Page<i32> = Page::new(Vec::new(), &request, 25);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
    }
}

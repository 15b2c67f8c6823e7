//! Pagination utilities
//!
//! Shared by the song list (rows per page) and the single-song view
//! (verses per page).

/// Page number used when the request has none (or an invalid one)
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when the request has none (or an invalid one)
pub const DEFAULT_PAGE_SIZE: i64 = 40;

/// Requested page, already defaulted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page number (1-indexed)
    pub page: i64,
    /// Items per page
    pub size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a request, replacing missing or non-positive values with defaults
    ///
    /// # Examples
    /// ```
    /// use songbook_catalog::pagination::PageRequest;
    ///
    /// let p = PageRequest::new(Some(3), None);
    /// assert_eq!((p.page, p.size), (3, 40));
    ///
    /// let p = PageRequest::new(Some(0), Some(-5));
    /// assert_eq!((p.page, p.size), (1, 40));
    /// ```
    pub fn new(page: Option<i64>, size: Option<i64>) -> Self {
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE),
            size: size.filter(|s| *s > 0).unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    /// Zero-based offset of the first item on this page
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.size)
    }
}

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Total number of pages
    pub total_pages: i64,
    /// Whether a page exists after the requested one
    pub has_next_page: bool,
}

/// Calculate pagination metadata from a total count and the requested page
///
/// Pure arithmetic: `page` and `size` are used as given (callers default them
/// through [`PageRequest`]); `size` must be positive.
///
/// # Examples
/// ```
/// use songbook_catalog::pagination::calculate_pagination;
///
/// // 250 results at 100 per page = 3 pages (100 + 100 + 50)
/// let p = calculate_pagination(250, 2, 100);
/// assert_eq!(p.total_pages, 3);
/// assert!(p.has_next_page);
///
/// // Past the end there is no next page
/// let p = calculate_pagination(250, 99, 100);
/// assert!(!p.has_next_page);
/// ```
pub fn calculate_pagination(count: i64, page: i64, size: i64) -> Pagination {
    let total_pages = count / size + i64::from(count % size != 0);

    Pagination {
        total_pages,
        has_next_page: page < total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_normal() {
        let p = calculate_pagination(250, 2, 100);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next_page);
    }

    #[test]
    fn test_pagination_last_page() {
        let p = calculate_pagination(250, 3, 100);
        assert_eq!(p.total_pages, 3);
        assert!(!p.has_next_page);
    }

    #[test]
    fn test_pagination_exact_page_boundary() {
        let p = calculate_pagination(200, 1, 100);
        assert_eq!(p.total_pages, 2);
        assert!(p.has_next_page);

        let p = calculate_pagination(200, 2, 100);
        assert!(!p.has_next_page);
    }

    #[test]
    fn test_pagination_empty() {
        let p = calculate_pagination(0, 1, 40);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next_page);
    }

    #[test]
    fn test_pagination_verses() {
        // 5 verses, 2 per page
        let p = calculate_pagination(5, 1, 2);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next_page);
    }

    #[test]
    fn test_pagination_matches_ceil_division() {
        for count in 0..60 {
            for size in 1..12 {
                for page in 1..8 {
                    let p = calculate_pagination(count, page, size);
                    let expected = (count as f64 / size as f64).ceil() as i64;
                    assert_eq!(p.total_pages, expected, "count={count} size={size}");
                    assert_eq!(p.has_next_page, page < expected);
                }
            }
        }
    }

    #[test]
    fn test_page_request_defaults() {
        assert_eq!(PageRequest::new(None, None), PageRequest::default());
        assert_eq!(PageRequest::new(Some(0), Some(0)), PageRequest::default());
        assert_eq!(
            PageRequest::new(Some(2), Some(10)),
            PageRequest { page: 2, size: 10 }
        );
    }

    #[test]
    fn test_page_request_offset() {
        assert_eq!(PageRequest::new(Some(1), Some(40)).offset(), 0);
        assert_eq!(PageRequest::new(Some(3), Some(2)).offset(), 4);
        assert_eq!(PageRequest::new(Some(i64::MAX), Some(i64::MAX)).offset(), i64::MAX);
    }
}

//! Page objects for post listings.

use serde::Serialize;

/// Posts shown per listing page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Which slice of a listing to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u64,
    pub size: u64,
}

impl PageRequest {
    pub fn new(number: u64, size: u64) -> Self {
        Self {
            number: number.max(1),
            size: size.max(1),
        }
    }

    /// Parse the raw `page` query value. Missing or malformed values fall
    /// back to the first page.
    pub fn from_query(raw: Option<&str>, size: u64) -> Self {
        let number = raw
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(1);
        Self::new(number, size)
    }

    pub fn offset(&self) -> u64 {
        (self.number - 1).saturating_mul(self.size)
    }

    pub fn limit(&self) -> u64 {
        self.size
    }
}

/// One page of an ordered listing plus navigation metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    /// Total number of items across all pages.
    pub count: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    /// Build the page for `request` out of its `items` and the total `count`.
    pub fn new(items: Vec<T>, request: PageRequest, count: u64) -> Self {
        let num_pages = count.div_ceil(request.size).max(1);
        Self {
            items,
            number: request.number,
            num_pages,
            count,
            has_next: request.number < num_pages,
            has_previous: request.number > 1 && count > 0,
        }
    }

    /// Slice an already materialised, ordered list.
    pub fn from_vec(all: Vec<T>, request: PageRequest) -> Self {
        let count = all.len() as u64;
        let items = all
            .into_iter()
            .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(request.limit()).unwrap_or(usize::MAX))
            .collect();
        Self::new(items, request, count)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(n: u64) -> Vec<u64> {
        (1..=n).collect()
    }

    #[test]
    fn test_from_query_defaults_to_first_page() {
        assert_eq!(PageRequest::from_query(None, 10).number, 1);
        assert_eq!(PageRequest::from_query(Some("abc"), 10).number, 1);
        assert_eq!(PageRequest::from_query(Some("0"), 10).number, 1);
        assert_eq!(PageRequest::from_query(Some("-3"), 10).number, 1);
        assert_eq!(PageRequest::from_query(Some(" 4 "), 10).number, 4);
    }

    #[test]
    fn test_page_sizes_follow_min_rule() {
        // 25 items, 10 per page: 10, 10, 5, then empty.
        for (number, expected) in [(1, 10), (2, 10), (3, 5), (4, 0), (9, 0)] {
            let page = Page::from_vec(listing(25), PageRequest::new(number, 10));
            assert_eq!(page.items.len(), expected, "page {number}");
            assert_eq!(page.num_pages, 3);
        }
    }

    #[test]
    fn test_last_page_navigation() {
        let page = Page::from_vec(listing(25), PageRequest::new(3, 10));
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert!(!page.has_next);
        assert!(page.has_previous);
    }

    #[test]
    fn test_page_beyond_end_is_empty_not_error() {
        let page = Page::from_vec(listing(5), PageRequest::new(7, 10));
        assert!(page.is_empty());
        assert!(!page.has_next);
        assert!(page.has_previous);
        assert_eq!(page.count, 5);
    }

    #[test]
    fn test_empty_listing_has_one_page() {
        let page = Page::from_vec(Vec::<u64>::new(), PageRequest::new(1, 10));
        assert_eq!(page.num_pages, 1);
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = Page::from_vec(listing(12), PageRequest::new(2, 5)).map(|n| n * 10);
        assert_eq!(page.items, vec![60, 70, 80, 90, 100]);
        assert_eq!(page.number, 2);
        assert!(page.has_next);
    }
}

//! Page cursor.

/// Current search page of one source, bounded by the crawl's page limit.
///
/// Pages are 1-based and the cursor never moves past `max_pages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    page: u32,
    max_pages: u32,
}

impl PageCursor {
    /// A cursor on page 1. A zero bound is treated as 1.
    #[must_use]
    pub fn new(max_pages: u32) -> Self {
        Self {
            page: 1,
            max_pages: max_pages.max(1),
        }
    }

    /// Current page.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Page limit.
    #[must_use]
    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Whether another page is allowed after the current one.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.max_pages
    }

    /// Moves to the next page, returning it, unless the limit is reached.
    pub fn advance(&mut self) -> Option<u32> {
        if !self.has_next() {
            return None;
        }
        self.page += 1;
        Some(self.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_stops_at_max_pages() {
        let mut cursor = PageCursor::new(3);
        assert_eq!(cursor.page(), 1);
        assert_eq!(cursor.advance(), Some(2));
        assert_eq!(cursor.advance(), Some(3));
        assert_eq!(cursor.advance(), None);
        assert_eq!(cursor.page(), 3);
    }

    #[test]
    fn test_single_page_cursor() {
        let mut cursor = PageCursor::new(1);
        assert!(!cursor.has_next());
        assert_eq!(cursor.advance(), None);
        assert_eq!(PageCursor::new(0).max_pages(), 1);
    }
}

//! Numbered page pagination.
//!
//! Listings are paged by number rather than cursor. Page tokens come straight
//! from the query string and are resolved leniently: anything that is not a
//! number lands on page 1 and anything past the end lands on the last page.

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A resolved page number with the offset/limit needed to fetch it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub page_size: u32,
}

impl PageWindow {
    /// Resolve a raw page token against `total` items.
    ///
    /// An empty listing still has one (empty) page.
    pub fn resolve(token: Option<&str>, total: u64, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        let num_pages = total.div_ceil(u64::from(page_size)).max(1);

        let requested = token.and_then(|raw| raw.trim().parse::<i64>().ok());
        let number = match requested {
            None => 1,
            Some(n) if n < 1 => 1,
            Some(n) => (n as u64).min(num_pages),
        };

        Self {
            number,
            num_pages,
            total,
            page_size,
        }
    }

    pub fn offset(&self) -> u64 {
        (self.number - 1) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }

    pub fn into_page<T>(self, items: Vec<T>) -> NumberedPage<T> {
        NumberedPage {
            items,
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
            page_size: self.page_size,
            has_previous: self.number > 1,
            has_next: self.number < self.num_pages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberedPage<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub page_size: u32,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> NumberedPage<T> {
    pub fn empty(page_size: u32) -> Self {
        PageWindow::resolve(None, 0, page_size).into_page(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_numeric_token_resolves_to_first_page() {
        let window = PageWindow::resolve(Some("abc"), 25, DEFAULT_PAGE_SIZE);
        assert_eq!(window.number, 1);
        assert_eq!(window.offset(), 0);
    }

    #[test]
    fn token_past_the_end_resolves_to_last_page() {
        let window = PageWindow::resolve(Some("999"), 25, DEFAULT_PAGE_SIZE);
        assert_eq!(window.num_pages, 3);
        assert_eq!(window.number, 3);
        assert_eq!(window.offset(), 20);
    }

    #[test]
    fn zero_and_negative_tokens_resolve_to_first_page() {
        assert_eq!(PageWindow::resolve(Some("0"), 25, 10).number, 1);
        assert_eq!(PageWindow::resolve(Some("-4"), 25, 10).number, 1);
    }

    #[test]
    fn empty_listing_has_one_page() {
        let page = PageWindow::resolve(Some("2"), 0, 10).into_page(Vec::<u8>::new());
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn middle_page_links_both_ways() {
        let page = PageWindow::resolve(Some(" 2 "), 25, 10).into_page(vec![1, 2, 3]);
        assert!(page.has_next);
        assert!(page.has_previous);
    }
}

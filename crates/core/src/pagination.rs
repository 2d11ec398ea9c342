//! Page-number pagination math.
//!
//! Lists are addressed by a 1-based `page` and a fixed per-resource page
//! size. Page 1 always exists, even for an empty result set; any other page
//! past the last one is rejected.

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: i64 = 35;

/// Chats listed per page.
pub const CHAT_PAGE_SIZE: i64 = 15;

/// Messages per page of chat history.
pub const CHAT_HISTORY_PAGE_SIZE: i64 = 10;

/// Participants per page of a chat member list.
pub const CHAT_PARTICIPANTS_PAGE_SIZE: i64 = 20;

/// A requested page of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub page_size: i64,
}

impl PageWindow {
    /// Build a window, treating a missing or non-positive page as page 1.
    pub fn new(page: Option<i64>, page_size: i64) -> Self {
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(1),
            page_size: page_size.max(1),
        }
    }

    /// SQL `LIMIT` for this window.
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// SQL `OFFSET` for this window.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    /// Number of pages needed for `count` items (at least one).
    pub fn page_count(&self, count: i64) -> i64 {
        if count <= 0 {
            1
        } else {
            (count + self.page_size - 1) / self.page_size
        }
    }

    /// Whether this page exists for a list of `count` items.
    pub fn is_valid(&self, count: i64) -> bool {
        self.page <= self.page_count(count)
    }

    pub fn next(&self, count: i64) -> Option<i64> {
        (self.page < self.page_count(count)).then_some(self.page + 1)
    }

    pub fn previous(&self) -> Option<i64> {
        (self.page > 1).then_some(self.page - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_page_defaults_to_first() {
        let w = PageWindow::new(None, DEFAULT_PAGE_SIZE);
        assert_eq!(w.page, 1);
        assert_eq!(w.offset(), 0);
        assert_eq!(PageWindow::new(Some(0), 10).page, 1);
    }

    #[test]
    fn offset_follows_page() {
        let w = PageWindow::new(Some(3), CHAT_HISTORY_PAGE_SIZE);
        assert_eq!(w.limit(), 10);
        assert_eq!(w.offset(), 20);
    }

    #[test]
    fn empty_list_has_one_page() {
        let w = PageWindow::new(Some(1), 15);
        assert!(w.is_valid(0));
        assert_eq!(w.next(0), None);
        assert_eq!(w.previous(), None);
        assert!(!PageWindow::new(Some(2), 15).is_valid(0));
    }

    #[test]
    fn neighbours() {
        let w = PageWindow::new(Some(2), 15);
        assert_eq!(w.page_count(31), 3);
        assert_eq!(w.next(31), Some(3));
        assert_eq!(w.previous(), Some(1));
        assert_eq!(w.next(30), None);
        assert!(!PageWindow::new(Some(3), 15).is_valid(30));
    }
}

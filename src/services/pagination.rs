//! Page arithmetic for the recency feed.
//!
//! Requested page numbers are clamped into `[0, max_page_no]`; asking past
//! the end yields the last page rather than an error. An empty feed still
//! has exactly one (empty) page.

/// Resolved position of one page within a result set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    pub page_no: usize,
    pub max_page_no: usize,
    pub offset: usize,
    pub limit: usize,
}

impl PageWindow {
    /// Clamp `requested` against `total_count` rows split into pages of
    /// `page_size` (treated as at least 1).
    pub fn resolve(total_count: u64, page_size: usize, requested: usize) -> Self {
        let page_size = page_size.max(1);
        let total = usize::try_from(total_count).unwrap_or(usize::MAX);
        let max_page_no = total.div_ceil(page_size).saturating_sub(1);
        let page_no = requested.min(max_page_no);

        Self {
            page_no,
            max_page_no,
            offset: page_no.saturating_mul(page_size),
            limit: page_size,
        }
    }

    pub fn has_prev(&self) -> bool {
        self.page_no > 0
    }

    pub fn has_next(&self) -> bool {
        self.page_no < self.max_page_no
    }

    pub fn prev_page(&self) -> Option<usize> {
        self.has_prev().then(|| self.page_no - 1)
    }

    pub fn next_page(&self) -> Option<usize> {
        self.has_next().then(|| self.page_no + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_feed_has_single_empty_page() {
        let window = PageWindow::resolve(0, 24, 5);
        assert_eq!(window.max_page_no, 0);
        assert_eq!(window.page_no, 0);
        assert_eq!(window.offset, 0);
        assert!(!window.has_prev());
        assert!(!window.has_next());
    }

    #[test]
    fn thirty_rows_make_two_pages() {
        let first = PageWindow::resolve(30, 24, 0);
        assert_eq!(first.max_page_no, 1);
        assert_eq!((first.offset, first.limit), (0, 24));
        assert!(!first.has_prev());
        assert!(first.has_next());
        assert_eq!(first.next_page(), Some(1));

        let second = PageWindow::resolve(30, 24, 1);
        assert_eq!(second.offset, 24);
        assert!(second.has_prev());
        assert!(!second.has_next());
        assert_eq!(second.prev_page(), Some(0));
        assert_eq!(second.next_page(), None);
    }

    #[test]
    fn exact_multiple_does_not_add_a_trailing_page() {
        assert_eq!(PageWindow::resolve(48, 24, 0).max_page_no, 1);
        assert_eq!(PageWindow::resolve(49, 24, 0).max_page_no, 2);
        assert_eq!(PageWindow::resolve(24, 24, 0).max_page_no, 0);
    }

    #[test]
    fn requests_past_the_end_clamp_to_last_page() {
        let window = PageWindow::resolve(30, 24, 99);
        assert_eq!(window.page_no, 1);
        assert_eq!(window.offset, 24);
    }

    #[test]
    fn zero_page_size_is_treated_as_one() {
        let window = PageWindow::resolve(3, 0, 2);
        assert_eq!(window.limit, 1);
        assert_eq!(window.max_page_no, 2);
        assert_eq!(window.offset, 2);
    }
}

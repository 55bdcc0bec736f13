/// One entry of the pager strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

/// Current page and page size. Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    page_size: usize,
    enabled: bool,
}

impl Pagination {
    pub fn new(page_size: usize, enabled: bool) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            enabled,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// ceil(rows / page_size), never below 1. A table without pagination
    /// is one page.
    pub fn total_pages(&self, row_count: usize) -> usize {
        if !self.enabled {
            return 1;
        }
        row_count.div_ceil(self.page_size).max(1)
    }

    /// Move to `page`, clamped into [1, total_pages]; returns the page used
    pub fn set_page(&mut self, page: usize, row_count: usize) -> usize {
        self.page = page.clamp(1, self.total_pages(row_count));
        self.page
    }

    pub fn set_page_size(&mut self, page_size: usize, row_count: usize) {
        self.page_size = page_size.max(1);
        self.clamp(row_count);
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Pull the current page back into range after the row count changed
    pub fn clamp(&mut self, row_count: usize) {
        self.set_page(self.page, row_count);
    }
}

/// Pager strip: every page when there are few, otherwise a window of
/// `max_visible` pages starting two before the current one, with the first
/// and last page and ellipses added around it.
pub fn page_numbers(current: usize, total_pages: usize, max_visible: usize) -> Vec<PageItem> {
    let max_visible = max_visible.max(1);
    if total_pages <= max_visible {
        return (1..=total_pages).map(PageItem::Page).collect();
    }

    let start = current.saturating_sub(2).max(1);
    let end = (start + max_visible - 1).min(total_pages);
    let mut items = Vec::with_capacity(max_visible + 4);

    if start > 1 {
        items.push(PageItem::Page(1));
        if start > 2 {
            items.push(PageItem::Ellipsis);
        }
    }

    items.extend((start..=end).map(PageItem::Page));

    if end < total_pages {
        if end < total_pages - 1 {
            items.push(PageItem::Ellipsis);
        }
        items.push(PageItem::Page(total_pages));
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageItem::{Ellipsis, Page};

    #[test]
    fn test_total_pages_and_clamp() {
        let mut p = Pagination::new(10, true);
        assert_eq!(p.total_pages(0), 1);
        assert_eq!(p.total_pages(10), 1);
        assert_eq!(p.total_pages(25), 3);

        assert_eq!(p.set_page(7, 25), 3);
        assert_eq!(p.set_page(0, 25), 1);
        p.set_page(3, 25);
        p.clamp(3);
        assert_eq!(p.page(), 1);
    }

    #[test]
    fn test_disabled_is_single_page() {
        let mut p = Pagination::new(10, false);
        assert_eq!(p.total_pages(95), 1);
        assert_eq!(p.set_page(4, 95), 1);
        assert!(!p.is_enabled());
    }

    #[test]
    fn test_zero_page_size_is_one() {
        let p = Pagination::new(0, true);
        assert_eq!(p.page_size(), 1);
        assert_eq!(p.total_pages(4), 4);
    }

    #[test]
    fn test_page_numbers() {
        assert_eq!(page_numbers(1, 3, 5), vec![Page(1), Page(2), Page(3)]);
        assert_eq!(
            page_numbers(1, 10, 5),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Ellipsis, Page(10)]
        );
        assert_eq!(
            page_numbers(6, 10, 5),
            vec![
                Page(1),
                Ellipsis,
                Page(4),
                Page(5),
                Page(6),
                Page(7),
                Page(8),
                Ellipsis,
                Page(10)
            ]
        );
        assert_eq!(
            page_numbers(10, 10, 5),
            vec![Page(1), Ellipsis, Page(8), Page(9), Page(10)]
        );
        assert_eq!(
            page_numbers(4, 7, 5),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Page(6), Page(7)]
        );
    }
}

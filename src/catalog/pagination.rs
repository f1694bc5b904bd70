//! Pagination stage: page math, page-link compression and page-reset tracking.

use crate::catalog::types::FilterCriteria;
use serde::{Serialize, Serializer};

/// Tools per catalog page.
pub const DEFAULT_PAGE_SIZE: usize = 18;

/// Up to this many pages, every page number is listed.
const MAX_UNCOMPRESSED_PAGES: usize = 5;

/// Pages shown around the current page when the list is compressed.
const WINDOW: usize = 3;

/// One entry of the navigable page sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page(usize),
    EllipsisStart,
    EllipsisEnd,
}

impl Serialize for PageLink {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageLink::Page(n) => serializer.serialize_u64(*n as u64),
            PageLink::EllipsisStart => serializer.serialize_str("ellipsis-start"),
            PageLink::EllipsisEnd => serializer.serialize_str("ellipsis-end"),
        }
    }
}

/// Always at least one page, even for an empty result.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    count.div_ceil(page_size).max(1)
}

/// Clamps a requested 1-based page into `1..=total`.
pub fn clamp_page(page: usize, total: usize) -> usize {
    page.clamp(1, total.max(1))
}

/// Navigable page numbers with ellipsis markers.
///
/// Up to five pages are all listed. Beyond that the first and last pages are
/// always shown together with a window of three pages around `current`,
/// shifted to stay inside `2..total`.
pub fn page_links(current: usize, total: usize) -> Vec<PageLink> {
    let total = total.max(1);
    if total <= MAX_UNCOMPRESSED_PAGES {
        return (1..=total).map(PageLink::Page).collect();
    }

    let current = clamp_page(current, total);
    let start = current.saturating_sub(1).clamp(2, total - WINDOW);
    let end = start + WINDOW - 1;

    let mut links = Vec::with_capacity(WINDOW + 4);
    links.push(PageLink::Page(1));
    if start > 2 {
        links.push(PageLink::EllipsisStart);
    }
    links.extend((start..=end).map(PageLink::Page));
    if end < total - 1 {
        links.push(PageLink::EllipsisEnd);
    }
    links.push(PageLink::Page(total));
    links
}

/// Returns the slice of `items` that belongs on `page` (1-based).
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let page_size = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Pagination descriptor returned alongside a page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub total_matches: usize,
    pub pages: Vec<PageLink>,
}

impl Pagination {
    pub fn new(total_matches: usize, page_size: usize, requested_page: usize) -> Self {
        let total = total_pages(total_matches, page_size);
        let current = clamp_page(requested_page, total);
        Self {
            current_page: current,
            total_pages: total,
            page_size,
            total_matches,
            pages: page_links(current, total),
        }
    }
}

/// Tracks the current page of a listing across criteria updates.
///
/// The page goes back to 1 whenever the criteria differ from the last ones
/// observed. Re-observing identical criteria (a re-fetch of the same data)
/// keeps the page.
#[derive(Debug, Clone)]
pub struct PageTracker {
    criteria: Option<FilterCriteria>,
    current: usize,
}

impl Default for PageTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PageTracker {
    pub fn new() -> Self {
        Self {
            criteria: None,
            current: 1,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current
    }

    /// Records the criteria of the next render. Returns true when the page was reset.
    pub fn observe(&mut self, criteria: &FilterCriteria) -> bool {
        if self.criteria.as_ref() == Some(criteria) {
            return false;
        }
        let had_previous = self.criteria.is_some();
        self.criteria = Some(criteria.clone());
        self.current = 1;
        had_previous
    }

    pub fn go_to(&mut self, page: usize, total_pages: usize) {
        self.current = clamp_page(page, total_pages);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageLink::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(37, 18), 3);
        assert_eq!(total_pages(36, 18), 2);
        assert_eq!(total_pages(0, 18), 1);
        assert_eq!(total_pages(1, 18), 1);
    }

    #[test]
    fn test_small_totals_list_every_page() {
        assert_eq!(page_links(1, 1), vec![Page(1)]);
        assert_eq!(
            page_links(3, 5),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5)]
        );
    }

    #[test]
    fn test_compressed_sequences() {
        assert_eq!(
            page_links(2, 10),
            vec![Page(1), Page(2), Page(3), Page(4), EllipsisEnd, Page(10)]
        );
        assert_eq!(
            page_links(1, 10),
            vec![Page(1), Page(2), Page(3), Page(4), EllipsisEnd, Page(10)]
        );
        assert_eq!(
            page_links(5, 10),
            vec![Page(1), EllipsisStart, Page(4), Page(5), Page(6), EllipsisEnd, Page(10)]
        );
        assert_eq!(
            page_links(10, 10),
            vec![Page(1), EllipsisStart, Page(7), Page(8), Page(9), Page(10)]
        );
        assert_eq!(
            page_links(3, 6),
            vec![Page(1), Page(2), Page(3), Page(4), EllipsisEnd, Page(6)]
        );
        assert_eq!(
            page_links(5, 6),
            vec![Page(1), EllipsisStart, Page(3), Page(4), Page(5), Page(6)]
        );
    }

    #[test]
    fn test_page_links_serialize_with_markers() {
        let json = serde_json::to_value(page_links(5, 10)).unwrap();
        assert_eq!(
            json,
            serde_json::json!([1, "ellipsis-start", 4, 5, 6, "ellipsis-end", 10])
        );
    }

    #[test]
    fn test_page_slice_bounds() {
        let items: Vec<usize> = (0..37).collect();
        assert_eq!(page_slice(&items, 1, 18).len(), 18);
        assert_eq!(page_slice(&items, 3, 18), &[36]);
        assert!(page_slice(&items, 4, 18).is_empty());
        let empty: Vec<usize> = vec![];
        assert!(page_slice(&empty, 1, 18).is_empty());
    }

    #[test]
    fn test_pagination_clamps_requested_page() {
        let p = Pagination::new(37, 18, 9);
        assert_eq!(p.current_page, 3);
        let p = Pagination::new(0, 18, 0);
        assert_eq!(p.current_page, 1);
        assert_eq!(p.total_pages, 1);
    }
}

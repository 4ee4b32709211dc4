//! Page-number pagination over an in-memory list.
//!
//! Category lists are small (one nearby search returns at most a few dozen places),
//! so they are sliced in memory rather than paged in the provider. Pages are
//! 1-indexed. Out-of-range requests are clamped here instead of trusting the
//! caller's controls: page 0 reads as page 1, anything past the end reads as the
//! last page.

use serde::Serialize;

/// Items per page in resource lists.
pub const PAGE_SIZE: usize = 5;

// ============================================================================
// Page
// ============================================================================

/// One page of a collection plus the numbers a pager control needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Page actually returned (after clamping).
    pub page: usize,
    /// Page the caller asked for.
    pub requested_page: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub total: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the requested page had to be clamped.
    pub fn was_clamped(&self) -> bool {
        self.page != self.requested_page
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            requested_page: self.requested_page,
            page_count: self.page_count,
            page_size: self.page_size,
            total: self.total,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}

// ============================================================================
// Slicing
// ============================================================================

/// Number of pages for `total` items, `ceil(total / page_size)`.
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Clamp a requested page into `1..=page_count` (1 when there are no pages).
pub fn clamp_page(requested: usize, page_count: usize) -> usize {
    requested.clamp(1, page_count.max(1))
}

/// Slice `items` into page `requested_page` of `page_size` items.
pub fn paginate<T: Clone>(items: &[T], requested_page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total = items.len();
    let pages = page_count(total, page_size);
    let page = clamp_page(requested_page, pages);

    let start = ((page - 1) * page_size).min(total);
    let end = (start + page_size).min(total);

    Page {
        items: items[start..end].to_vec(),
        page,
        requested_page,
        page_count: pages,
        page_size,
        total,
        has_next: page < pages,
        has_previous: page > 1,
    }
}

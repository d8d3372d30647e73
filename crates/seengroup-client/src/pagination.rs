//! Local pagination over a fully fetched list.

/// Page size of the public job board.
pub const JOBS_PAGE_SIZE: usize = 5;
/// Page size of the product catalog.
pub const PRODUCTS_PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based, already clamped.
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// `ceil(n / size)`. A zero page size yields zero pages.
pub fn total_pages(n: usize, size: usize) -> usize {
    if size == 0 {
        return 0;
    }
    n.div_ceil(size)
}

/// Clamp to `[1, max(total_pages, 1)]`.
pub fn clamp_page(requested: usize, total_pages: usize) -> usize {
    requested.clamp(1, total_pages.max(1))
}

pub fn paginate<T: Clone>(items: &[T], requested: usize, size: usize) -> Page<T> {
    let total = total_pages(items.len(), size);
    let page = clamp_page(requested, total);
    let start = (page - 1).saturating_mul(size).min(items.len());
    let end = start.saturating_add(size).min(items.len());
    Page {
        items: items[start..end].to_vec(),
        page,
        total_pages: total,
        total_items: items.len(),
    }
}

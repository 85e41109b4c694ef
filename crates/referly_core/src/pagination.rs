//! Page window arithmetic
//!
//! Pages are 1-based. A page of `0` is read as the first page so callers never
//! underflow the start offset.

/// First page number
pub const DEFAULT_PAGE: usize = 1;

/// Items per page when the caller does not ask for a size
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Slice `[(page-1)*per_page, (page-1)*per_page + per_page)` out of `items`,
/// clamped to the slice bounds.
pub fn page_window<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    let page = page.max(DEFAULT_PAGE);
    let start = (page - 1).saturating_mul(per_page).min(items.len());
    let end = start.saturating_add(per_page).min(items.len());
    &items[start..end]
}

/// Number of pages needed to show `total` items
pub fn page_count(total: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_page_of_sixteen_holds_six() {
        let items: Vec<u32> = (1..=16).collect();
        let page = page_window(&items, 2, 10);
        assert_eq!(page.len(), 6);
        assert_eq!(page.first(), Some(&11));
    }

    #[test]
    fn out_of_range_page_is_empty() {
        let items: Vec<u32> = (1..=5).collect();
        assert!(page_window(&items, 3, 10).is_empty());
        assert!(page_window(&items, usize::MAX, usize::MAX).is_empty());
    }

    #[test]
    fn page_zero_reads_as_first_page() {
        let items: Vec<u32> = (1..=5).collect();
        assert_eq!(page_window(&items, 0, 2), &[1, 2]);
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(16, 10), 2);
        assert_eq!(page_count(20, 10), 2);
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(5, 0), 0);
    }
}

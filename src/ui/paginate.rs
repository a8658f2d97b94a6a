/// Page sizes always offered by the size selector.
pub const PAGE_SIZE_PRESETS: [usize; 3] = [25, 50, 100];
/// Up to this many pages only first/prev/next/last are shown.
pub const SIMPLE_NAV_MAX: usize = 2;
/// Up to this many pages every page number is shown; beyond it the window is truncated.
pub const MAX_FULL_PAGES: usize = 7;
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// One page of a list plus the numbers needed to draw the pager.
#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    pub slice: &'a [T],
    pub total: usize,
    pub pages: usize,
    /// Requested page clamped into `1..=pages`.
    pub page: usize,
    pub start: usize,
    pub end: usize,
}

pub fn paginate<T>(list: &[T], page: usize, page_size: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total = list.len();
    let pages = total.div_ceil(page_size).max(1);
    let page = page.clamp(1, pages);
    let start = ((page - 1) * page_size).min(total);
    let end = (start + page_size).min(total);
    Page {
        slice: &list[start..end],
        total,
        pages,
        page,
        start,
        end,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Number(usize),
    Ellipsis,
}

/// Page numbers for the pager: all of them up to [`MAX_FULL_PAGES`], else
/// `1, …, current-1, current, current+1, …, last`.
pub fn page_numbers(total_pages: usize, current: usize) -> Vec<PageItem> {
    if total_pages <= MAX_FULL_PAGES {
        return (1..=total_pages).map(PageItem::Number).collect();
    }
    let left = current.saturating_sub(1).max(2);
    let right = (current + 1).min(total_pages - 1);
    let mut items = vec![PageItem::Number(1)];
    if left > 2 {
        items.push(PageItem::Ellipsis);
    }
    items.extend((left..=right).map(PageItem::Number));
    if right < total_pages - 1 {
        items.push(PageItem::Ellipsis);
    }
    items.push(PageItem::Number(total_pages));
    items
}

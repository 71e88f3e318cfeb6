use serde::Serialize;

pub const MAX_PAGE_SIZE: usize = 100;

pub fn default_page() -> usize {
    1
}

pub fn default_page_size() -> usize {
    20
}

/// Paginated list body: total count plus the requested page slice.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub count: usize,
    pub results: Vec<T>,
}

/// Slice `items` down to one page. `page` is 1-based; `page_size` is
/// capped at [`MAX_PAGE_SIZE`]. Out-of-range pages yield empty results
/// with the true total count.
pub fn paginate<T: Serialize>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let count = items.len();
    let page = page.max(1);
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
    let start = (page - 1).saturating_mul(page_size);

    let results = if start >= count {
        Vec::new()
    } else {
        items.into_iter().skip(start).take(page_size).collect()
    };

    Page { count, results }
}

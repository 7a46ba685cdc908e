pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;
/// Largest page whose offset still fits in an `i64` at `MAX_PER_PAGE`.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PER_PAGE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub per_page: i64,
    pub offset: i64,
}

impl PageWindow {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        let page = page.unwrap_or(1).clamp(1, MAX_PAGE);
        let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
        Self {
            page,
            per_page,
            offset: (page - 1) * per_page,
        }
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        ((total as f64) / (self.per_page as f64)).ceil() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_twenty() {
        let window = PageWindow::new(None, None);
        assert_eq!(window, PageWindow { page: 1, per_page: 20, offset: 0 });
    }

    #[test]
    fn huge_page_is_capped_without_overflow() {
        let window = PageWindow::new(Some(i64::MAX), Some(i64::MAX));
        assert_eq!(window.page, MAX_PAGE);
        assert_eq!(window.per_page, MAX_PER_PAGE);
        assert!(window.offset > 0);
    }

    #[test]
    fn non_positive_values_are_raised_to_one() {
        let window = PageWindow::new(Some(-4), Some(0));
        assert_eq!(window, PageWindow { page: 1, per_page: 1, offset: 0 });
        assert_eq!(window.total_pages(3), 3);
    }
}

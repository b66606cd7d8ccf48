use serde::Serialize;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// Pagination window: 1-indexed page plus page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub limit: i64,
}

impl PageWindow {
    /// Parse raw `page` / `limit` request parameters. Missing, non-numeric
    /// or sub-1 values fall back to the defaults without erroring; the limit
    /// is capped by the configured maximum.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = parse_positive(page).unwrap_or(DEFAULT_PAGE);
        let mut limit = parse_positive(limit).unwrap_or(DEFAULT_LIMIT);

        let max_limit = crate::config::config().query.max_limit;
        if limit > max_limit {
            tracing::debug!(limit, max_limit, "capping requested page size");
            limit = max_limit;
        }

        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

fn parse_positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok()).filter(|v| *v >= 1)
}

/// Standard list-response envelope shared by every paginated endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total_count: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total_count: i64, window: &PageWindow) -> Self {
        Self {
            data,
            total_count,
            page: window.page,
            limit: window.limit,
            total_pages: ceil_div(total_count, window.limit),
        }
    }
}

fn ceil_div(count: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (count + limit - 1) / limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_params_missing() {
        let w = PageWindow::from_raw(None, None);
        assert_eq!(w.page, 1);
        assert_eq!(w.limit, 10);
        assert_eq!(w.offset(), 0);
    }

    #[test]
    fn non_numeric_params_fall_back_to_defaults() {
        let w = PageWindow::from_raw(Some("abc"), Some(""));
        assert_eq!(w.page, 1);
        assert_eq!(w.limit, 10);
    }

    #[test]
    fn zero_and_negative_values_fall_back_to_defaults() {
        let w = PageWindow::from_raw(Some("0"), Some("-5"));
        assert_eq!(w.page, 1);
        assert_eq!(w.limit, 10);
    }

    #[test]
    fn offset_is_page_minus_one_times_limit() {
        let w = PageWindow::from_raw(Some("3"), Some("25"));
        assert_eq!(w.offset(), 50);
    }

    #[test]
    fn total_pages_is_ceiling_of_count_over_limit() {
        let window = PageWindow { page: 1, limit: 10 };
        assert_eq!(Page::<i32>::new(vec![], 0, &window).total_pages, 0);
        assert_eq!(Page::<i32>::new(vec![], 10, &window).total_pages, 1);
        assert_eq!(Page::<i32>::new(vec![], 11, &window).total_pages, 2);
        assert_eq!(Page::<i32>::new(vec![], 95, &window).total_pages, 10);
    }

    #[test]
    fn page_envelope_serializes_camel_case() {
        let window = PageWindow { page: 2, limit: 5 };
        let page = Page::new(vec![1, 2, 3], 13, &window);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalCount"], 13);
        assert_eq!(json["page"], 2);
        assert_eq!(json["limit"], 5);
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["data"].as_array().unwrap().len(), 3);
    }
}

//! Translation of raw request parameters into store-level queries.
//!
//! Everything here is a pure transformation: filter/sort/page parameters in,
//! `ListSpec` (predicate + sort key + pagination window) out. Defaults are
//! applied leniently - malformed numbers and unknown sort columns fall back
//! instead of erroring.

pub mod order;
pub mod page;
pub mod predicate;
pub mod types;

pub use order::SortKey;
pub use page::{Page, PageWindow};
pub use predicate::{Condition, Predicate};
pub use types::{Scalar, SortDirection};

use chrono::{DateTime, NaiveDate, Utc};

/// Complete listing specification for one store query.
#[derive(Debug, Clone, Default)]
pub struct ListSpec {
    pub predicate: Predicate,
    pub order: Option<SortKey>,
    pub page: Option<PageWindow>,
}

impl ListSpec {
    pub fn filtered(predicate: Predicate) -> Self {
        Self { predicate, order: None, page: None }
    }
}

/// Parse a date parameter: RFC 3339 timestamps or bare `YYYY-MM-DD` dates
/// (interpreted as midnight UTC). Returns None for anything else.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_timestamps() {
        let ts = parse_timestamp("2024-06-01T12:30:00Z").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-06-01T12:30:00+00:00");
    }

    #[test]
    fn parses_bare_dates_as_midnight_utc() {
        let ts = parse_timestamp("2024-06-01").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-06-01T00:00:00+00:00");
    }

    #[test]
    fn rejects_garbage_dates() {
        assert!(parse_timestamp("next tuesday").is_none());
        assert!(parse_timestamp("").is_none());
    }
}

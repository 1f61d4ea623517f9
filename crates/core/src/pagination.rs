//! Lenient page/limit parsing for list endpoints.
//!
//! Query values arrive as raw strings. Anything missing, non-numeric, or
//! below 1 falls back to the default instead of failing the request.

/// Page returned when `?page=` is absent or invalid.
pub const DEFAULT_PAGE: i64 = 1;

/// Default page size for post and version listings.
pub const DEFAULT_LIMIT: i64 = 10;

/// Default page size for tag listings.
pub const DEFAULT_TAG_LIMIT: i64 = 20;

/// Upper bound applied to every page size.
pub const MAX_LIMIT: i64 = 100;

/// A resolved page request. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Resolve raw `page` and `limit` query values.
    pub fn parse(page: Option<&str>, limit: Option<&str>, default_limit: i64) -> Self {
        Self {
            page: parse_positive(page).unwrap_or(DEFAULT_PAGE),
            limit: parse_positive(limit)
                .unwrap_or(default_limit)
                .min(MAX_LIMIT),
        }
    }

    /// Row offset for `OFFSET`.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Resolve a bare `?limit=` value (used by endpoints without pages).
pub fn parse_limit(raw: Option<&str>, default_limit: i64) -> i64 {
    parse_positive(raw).unwrap_or(default_limit).min(MAX_LIMIT)
}

fn parse_positive(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n >= 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_absent() {
        let p = Pagination::parse(None, None, DEFAULT_LIMIT);
        assert_eq!(p, Pagination { page: 1, limit: 10 });
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_non_numeric_falls_back() {
        let p = Pagination::parse(Some("abc"), Some("xyz"), DEFAULT_LIMIT);
        assert_eq!(p, Pagination { page: 1, limit: 10 });
    }

    #[test]
    fn test_zero_and_negative_fall_back() {
        let p = Pagination::parse(Some("0"), Some("-5"), DEFAULT_TAG_LIMIT);
        assert_eq!(p, Pagination { page: 1, limit: 20 });
    }

    #[test]
    fn test_explicit_values_and_offset() {
        let p = Pagination::parse(Some("2"), Some("5"), DEFAULT_LIMIT);
        assert_eq!(p, Pagination { page: 2, limit: 5 });
        assert_eq!(p.offset(), 5, "second page of five skips five rows");
    }

    #[test]
    fn test_limit_is_capped() {
        let p = Pagination::parse(None, Some("1000"), DEFAULT_LIMIT);
        assert_eq!(p.limit, MAX_LIMIT);
        assert_eq!(parse_limit(Some("500"), 10), MAX_LIMIT);
        assert_eq!(parse_limit(Some("nope"), 10), 10);
    }
}

//! Shared query parameter types for API handlers.

use quill_core::pagination::Pagination;
use serde::Deserialize;

/// Raw `?page=&limit=` parameters.
///
/// Kept as strings so that non-numeric values fall back to defaults
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PaginationParams {
    pub fn resolve(&self, default_limit: i64) -> Pagination {
        Pagination::parse(self.page.as_deref(), self.limit.as_deref(), default_limit)
    }
}

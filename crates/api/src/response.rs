//! Shared response envelope types for API handlers.
//!
//! Single-entity responses use a `{ "data": ... }` envelope, lists add
//! `page`, `limit` and `total`.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope, with an optional
/// human-readable `message` for mutations.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse::new(post).with_message("Post created successfully")))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            message: None,
        }
    }

    pub fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

/// One page of a listing plus the total across all pages.
#[derive(Debug, Serialize)]
pub struct PageResponse<T: Serialize> {
    pub data: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}

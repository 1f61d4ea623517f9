//! Post entity, filters and DTOs.

use quill_core::status::PublicationStatus;
use quill_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A post as returned by the read queries.
///
/// `status` is derived (published when any version is published) and the
/// content columns come from the head version: the most recently updated
/// draft, or the published version when no draft exists.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Post {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub slug: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: PublicationStatus,
    pub author_name: String,
    pub version_id: Option<DbId>,
    pub content_markdown: Option<String>,
    pub content_json: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert DTO for a post together with its initial draft version.
#[derive(Debug, Clone)]
pub struct CreatePost {
    pub user_id: DbId,
    pub title: String,
    pub slug: Option<String>,
    pub content_markdown: String,
    pub content_json: serde_json::Value,
}

/// Patch DTO for the `posts` row itself.
#[derive(Debug, Clone, Default)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub slug: Option<String>,
}

/// Filters for the post listing. `None` disables a filter.
///
/// `tag_ids` matches posts carrying any of the given tags.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub user_id: Option<DbId>,
    pub tag_ids: Option<Vec<DbId>>,
    pub status: Option<PublicationStatus>,
}

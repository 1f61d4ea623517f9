//! Tag and post-tag models.

use quill_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `tags` table. `name` is always normalized.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tag {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub usage_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Lightweight tag info embedded in post responses.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct TagInfo {
    pub id: DbId,
    pub name: String,
}

/// A tag joined through `post_tags`, used to batch-load tags for a page of posts.
#[derive(Debug, Clone, FromRow)]
pub struct PostTagInfo {
    pub post_id: DbId,
    pub id: DbId,
    pub name: String,
}

impl From<PostTagInfo> for TagInfo {
    fn from(row: PostTagInfo) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

/// Sort order for `GET /tags`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagSort {
    #[default]
    Name,
    UsageCount,
    CreatedAt,
}

impl TagSort {
    /// Resolve a `?sort=` value; unknown or missing values sort by name.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("usage_count") => Self::UsageCount,
            Some("created_at") => Self::CreatedAt,
            _ => Self::Name,
        }
    }

    pub fn order_by(&self) -> &'static str {
        match self {
            Self::Name => "name ASC",
            Self::UsageCount => "usage_count DESC, name ASC",
            Self::CreatedAt => "created_at DESC, id DESC",
        }
    }
}

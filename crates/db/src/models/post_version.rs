//! Post version entity and DTOs.

use quill_core::status::PublicationStatus;
use quill_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `post_versions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PostVersion {
    pub id: DbId,
    pub post_id: DbId,
    pub author_id: DbId,
    pub title: String,
    pub content_markdown: String,
    pub content_json: serde_json::Value,
    #[sqlx(try_from = "String")]
    pub status: PublicationStatus,
    /// Set while the version is the published one.
    pub published_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Full content of a version, used when overwriting a draft.
#[derive(Debug, Clone)]
pub struct VersionContent {
    pub title: String,
    pub content_markdown: String,
    pub content_json: serde_json::Value,
}

/// Content for a draft upsert. `None` fields keep the existing draft's
/// value, or are seeded from the published version for a new draft.
#[derive(Debug, Clone, Default)]
pub struct DraftContent {
    pub title: Option<String>,
    pub content_markdown: Option<String>,
    pub content_json: Option<serde_json::Value>,
}

/// Result of a draft upsert.
#[derive(Debug, Clone)]
pub struct SavedDraft {
    pub version: PostVersion,
    /// `true` when a new draft row was inserted, `false` when an existing
    /// draft was overwritten.
    pub created: bool,
}

/// Filters for the version listing.
#[derive(Debug, Clone, Default)]
pub struct VersionFilter {
    pub author_id: Option<DbId>,
    pub status: Option<PublicationStatus>,
}

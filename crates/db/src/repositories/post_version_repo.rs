//! Repository for the `post_versions` table.
//!
//! A post has at most one `published` version, enforced by the partial
//! unique index `uq_post_versions_one_published`. Workflows that change
//! which version is published, or that decide between creating and
//! overwriting a draft, lock the parent `posts` row first so concurrent
//! callers for the same post run one after another.

use quill_core::status::PublicationStatus;
use quill_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::post_version::{
    DraftContent, PostVersion, SavedDraft, VersionContent, VersionFilter,
};

/// Column list for `post_versions` queries.
const COLUMNS: &str = "\
    id, post_id, author_id, title, content_markdown, content_json, status, \
    published_at, created_at, updated_at";

/// Shared `WHERE` clause for the filtered listing; `$1` author, `$2` status.
const FILTER_CLAUSE: &str = "\
    WHERE ($1::BIGINT IS NULL OR author_id = $1) \
      AND ($2::TEXT IS NULL OR status = $2)";

/// Provides CRUD and publish operations for post versions.
pub struct PostVersionRepo;

impl PostVersionRepo {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PostVersion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM post_versions WHERE id = $1");
        sqlx::query_as::<_, PostVersion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All versions of a post, newest first.
    pub async fn list_for_post(
        pool: &PgPool,
        post_id: DbId,
    ) -> Result<Vec<PostVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM post_versions \
             WHERE post_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, PostVersion>(&query)
            .bind(post_id)
            .fetch_all(pool)
            .await
    }

    /// One page of versions across all posts, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &VersionFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM post_versions {FILTER_CLAUSE} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, PostVersion>(&query)
            .bind(filter.author_id)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, filter: &VersionFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM post_versions {FILTER_CLAUSE}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(filter.author_id)
            .bind(filter.status.map(|s| s.as_str()))
            .fetch_one(pool)
            .await
    }

    /// The published version of a post, if any.
    pub async fn find_published_in(
        conn: &mut PgConnection,
        post_id: DbId,
    ) -> Result<Option<PostVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM post_versions \
             WHERE post_id = $1 AND status = 'published'"
        );
        sqlx::query_as::<_, PostVersion>(&query)
            .bind(post_id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// The most recently updated pending draft of a post, if any.
    ///
    /// A draft is pending when it was edited after the published version was
    /// published. Versions demoted by a later publish are history, not
    /// pending work.
    pub async fn find_pending_draft_in(
        conn: &mut PgConnection,
        post_id: DbId,
    ) -> Result<Option<PostVersion>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM post_versions v \
             WHERE v.post_id = $1 AND v.status = 'draft' \
               AND NOT EXISTS ( \
                   SELECT 1 FROM post_versions pv \
                   WHERE pv.post_id = v.post_id AND pv.status = 'published' \
                     AND pv.published_at >= v.updated_at) \
             ORDER BY v.updated_at DESC, v.id DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, PostVersion>(&query)
            .bind(post_id)
            .fetch_optional(&mut *conn)
            .await
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Insert a new draft version.
    pub async fn create_draft_in(
        conn: &mut PgConnection,
        post_id: DbId,
        author_id: DbId,
        content: &VersionContent,
    ) -> Result<PostVersion, sqlx::Error> {
        let query = format!(
            "INSERT INTO post_versions \
                 (post_id, author_id, title, content_markdown, content_json, status) \
             VALUES ($1, $2, $3, $4, $5, 'draft') \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PostVersion>(&query)
            .bind(post_id)
            .bind(author_id)
            .bind(&content.title)
            .bind(&content.content_markdown)
            .bind(&content.content_json)
            .fetch_one(&mut *conn)
            .await
    }

    /// Lock the parent post row for the rest of the transaction.
    ///
    /// Returns the post title, or `None` if the post does not exist.
    pub async fn lock_post_in(
        conn: &mut PgConnection,
        post_id: DbId,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT title FROM posts WHERE id = $1 FOR UPDATE")
            .bind(post_id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Overwrite the post's pending draft, or create one.
    ///
    /// With a pending draft, supplied fields replace its values in place.
    /// Without one, a new draft is inserted whose missing fields are copied
    /// from the published version, falling back to the post title and empty
    /// content. Returns `None` if the post does not exist.
    pub async fn save_draft_in(
        conn: &mut PgConnection,
        post_id: DbId,
        author_id: DbId,
        content: DraftContent,
    ) -> Result<Option<SavedDraft>, sqlx::Error> {
        let Some(post_title) = Self::lock_post_in(&mut *conn, post_id).await? else {
            return Ok(None);
        };

        if let Some(draft) = Self::find_pending_draft_in(&mut *conn, post_id).await? {
            let merged = VersionContent {
                title: content.title.unwrap_or(draft.title),
                content_markdown: content.content_markdown.unwrap_or(draft.content_markdown),
                content_json: content.content_json.unwrap_or(draft.content_json),
            };
            let version = Self::overwrite_content_in(&mut *conn, draft.id, &merged).await?;
            return Ok(Some(SavedDraft {
                version,
                created: false,
            }));
        }

        let seed = Self::find_published_in(&mut *conn, post_id).await?;
        let seeded = match seed {
            Some(published) => VersionContent {
                title: content.title.unwrap_or(published.title),
                content_markdown: content
                    .content_markdown
                    .unwrap_or(published.content_markdown),
                content_json: content.content_json.unwrap_or(published.content_json),
            },
            None => VersionContent {
                title: content.title.unwrap_or(post_title),
                content_markdown: content.content_markdown.unwrap_or_default(),
                content_json: content.content_json.unwrap_or_else(empty_document),
            },
        };

        let version = Self::create_draft_in(&mut *conn, post_id, author_id, &seeded).await?;
        Ok(Some(SavedDraft {
            version,
            created: true,
        }))
    }

    /// [`save_draft_in`](Self::save_draft_in) in a transaction of its own.
    pub async fn save_draft(
        pool: &PgPool,
        post_id: DbId,
        author_id: DbId,
        content: DraftContent,
    ) -> Result<Option<SavedDraft>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let saved = Self::save_draft_in(&mut *tx, post_id, author_id, content).await?;
        tx.commit().await?;
        Ok(saved)
    }

    async fn overwrite_content_in(
        conn: &mut PgConnection,
        id: DbId,
        content: &VersionContent,
    ) -> Result<PostVersion, sqlx::Error> {
        let query = format!(
            "UPDATE post_versions SET \
                 title = $2, content_markdown = $3, content_json = $4 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PostVersion>(&query)
            .bind(id)
            .bind(&content.title)
            .bind(&content.content_markdown)
            .bind(&content.content_json)
            .fetch_one(&mut *conn)
            .await
    }

    /// Replace the content of a version that is still a draft.
    ///
    /// Returns `None` if the version does not exist or is no longer a draft.
    pub async fn update_draft_content(
        pool: &PgPool,
        id: DbId,
        content: &VersionContent,
    ) -> Result<Option<PostVersion>, sqlx::Error> {
        let query = format!(
            "UPDATE post_versions SET \
                 title = $2, content_markdown = $3, content_json = $4 \
             WHERE id = $1 AND status = 'draft' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PostVersion>(&query)
            .bind(id)
            .bind(&content.title)
            .bind(&content.content_markdown)
            .bind(&content.content_json)
            .fetch_optional(pool)
            .await
    }

    /// Make this version the post's single published version.
    ///
    /// In one transaction: lock the parent post, demote any other published
    /// version to draft, then promote this one. Publishing the version that
    /// is already published leaves it unchanged. Returns `None` if the
    /// version does not exist.
    pub async fn publish(pool: &PgPool, id: DbId) -> Result<Option<PostVersion>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let post_id =
            sqlx::query_scalar::<_, DbId>("SELECT post_id FROM post_versions WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(post_id) = post_id else {
            return Ok(None);
        };

        Self::lock_post_in(&mut *tx, post_id).await?;

        // Demote first so the partial unique index never sees two rows.
        sqlx::query(
            "UPDATE post_versions SET status = $3, published_at = NULL \
             WHERE post_id = $1 AND id <> $2 AND status = $4",
        )
        .bind(post_id)
        .bind(id)
        .bind(PublicationStatus::Draft.as_str())
        .bind(PublicationStatus::Published.as_str())
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE post_versions SET \
                 published_at = CASE WHEN status = $2 THEN published_at ELSE NOW() END, \
                 status = $2 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let version = sqlx::query_as::<_, PostVersion>(&query)
            .bind(id)
            .bind(PublicationStatus::Published.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(version)
    }
}

/// Content for a draft created without any JSON document.
pub fn empty_document() -> serde_json::Value {
    serde_json::json!({})
}

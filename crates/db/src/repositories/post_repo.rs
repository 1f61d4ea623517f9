//! Repository for the `posts` table.
//!
//! Reads go through [`POST_SELECT`], which derives the post status from its
//! versions and joins the head version's content and the author name, so a
//! post row is never returned without them.

use quill_core::types::DbId;
use sqlx::PgPool;

use crate::models::post::{CreatePost, Post, PostFilter, UpdatePost};
use crate::models::post_version::{DraftContent, VersionContent};
use crate::repositories::{PostVersionRepo, TagRepo};

/// Base read query. The head version is the most recently updated draft
/// edited since the current publication, or the published version when
/// there is no such draft.
const POST_SELECT: &str = "\
    SELECT p.id, p.user_id, p.title, p.slug, \
           CASE WHEN EXISTS ( \
                    SELECT 1 FROM post_versions sv \
                    WHERE sv.post_id = p.id AND sv.status = 'published') \
                THEN 'published' ELSE 'draft' END AS status, \
           u.name AS author_name, \
           hv.id AS version_id, hv.content_markdown, hv.content_json, \
           p.created_at, p.updated_at \
    FROM posts p \
    JOIN users u ON u.id = p.user_id \
    LEFT JOIN LATERAL ( \
        SELECT v.id, v.content_markdown, v.content_json \
        FROM post_versions v \
        WHERE v.post_id = p.id \
          AND (v.status = 'published' OR NOT EXISTS ( \
                   SELECT 1 FROM post_versions pv \
                   WHERE pv.post_id = p.id AND pv.status = 'published' \
                     AND pv.published_at >= v.updated_at)) \
        ORDER BY (v.status = 'draft') DESC, v.updated_at DESC, v.id DESC \
        LIMIT 1 \
    ) hv ON TRUE";

/// Filter over the derived view; `$1` owner, `$2` tag ids (any), `$3` status.
const FILTER_CLAUSE: &str = "\
    WHERE ($1::BIGINT IS NULL OR feed.user_id = $1) \
      AND ($2::BIGINT[] IS NULL OR EXISTS ( \
               SELECT 1 FROM post_tags pt \
               WHERE pt.post_id = feed.id AND pt.tag_id = ANY($2))) \
      AND ($3::TEXT IS NULL OR feed.status = $3)";

/// Provides CRUD operations for posts.
pub struct PostRepo;

impl PostRepo {
    /// Create a post, its initial draft version and its tag associations in
    /// one transaction. Any failure rolls all of it back.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePost,
        tag_names: &[String],
    ) -> Result<DbId, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let post_id = sqlx::query_scalar::<_, DbId>(
            "INSERT INTO posts (user_id, title, slug) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(input.user_id)
        .bind(&input.title)
        .bind(input.slug.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        let content = VersionContent {
            title: input.title.clone(),
            content_markdown: input.content_markdown.clone(),
            content_json: input.content_json.clone(),
        };
        PostVersionRepo::create_draft_in(&mut *tx, post_id, input.user_id, &content).await?;

        if !tag_names.is_empty() {
            TagRepo::replace_post_tags_in(&mut *tx, post_id, tag_names).await?;
        }

        tx.commit().await?;
        Ok(post_id)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Post>, sqlx::Error> {
        let query = format!("{POST_SELECT} WHERE p.id = $1");
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Owner of a post, or `None` if it does not exist.
    pub async fn find_owner(pool: &PgPool, id: DbId) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT user_id FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of posts, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, sqlx::Error> {
        let query = format!(
            "SELECT feed.* FROM ({POST_SELECT}) feed {FILTER_CLAUSE} \
             ORDER BY feed.created_at DESC, feed.id DESC \
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(filter.user_id)
            .bind(filter.tag_ids.as_deref())
            .bind(filter.status.map(|s| s.as_str()))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total number of posts matching the filter, ignoring pagination.
    pub async fn count(pool: &PgPool, filter: &PostFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM ({POST_SELECT}) feed {FILTER_CLAUSE}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(filter.user_id)
            .bind(filter.tag_ids.as_deref())
            .bind(filter.status.map(|s| s.as_str()))
            .fetch_one(pool)
            .await
    }

    /// Update the post row, upsert its draft and optionally replace its tags,
    /// all in one transaction.
    ///
    /// `draft` of `None` leaves the versions untouched. Returns `false` if the
    /// post does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        author_id: DbId,
        input: &UpdatePost,
        draft: Option<DraftContent>,
        tag_names: Option<&[String]>,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated = sqlx::query_scalar::<_, DbId>(
            "UPDATE posts SET \
                 title = COALESCE($2, title), \
                 slug = COALESCE($3, slug) \
             WHERE id = $1 \
             RETURNING id",
        )
        .bind(id)
        .bind(input.title.as_deref())
        .bind(input.slug.as_deref())
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            return Ok(false);
        }

        if let Some(content) = draft {
            PostVersionRepo::save_draft_in(&mut *tx, id, author_id, content).await?;
        }

        if let Some(names) = tag_names {
            TagRepo::replace_post_tags_in(&mut *tx, id, names).await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Delete a post: versions first, then the post row, in one transaction.
    /// `post_tags` rows go via FK cascade.
    ///
    /// Returns `true` if the post existed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM post_versions WHERE post_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

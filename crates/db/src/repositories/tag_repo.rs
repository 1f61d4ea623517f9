//! Repository for the `tags` and `post_tags` tables.
//!
//! Names passed in are expected to be normalized already; see
//! [`quill_core::tags::normalize_tag_name`].

use quill_core::tags::normalize_tag_names;
use quill_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::tag::{PostTagInfo, Tag, TagInfo, TagSort};

/// Column list for `tags` queries.
const TAG_COLUMNS: &str = "id, name, description, usage_count, created_at, updated_at";

/// Provides CRUD operations for tags and post-tag associations.
pub struct TagRepo;

impl TagRepo {
    // -----------------------------------------------------------------------
    // Tag CRUD
    // -----------------------------------------------------------------------

    /// Insert a tag. A duplicate name violates `uq_tags_name`.
    pub async fn create(pool: &PgPool, name: &str, description: &str) -> Result<Tag, sqlx::Error> {
        let query = format!(
            "INSERT INTO tags (name, description) VALUES ($1, $2) RETURNING {TAG_COLUMNS}"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(name)
            .bind(description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = $1");
        sqlx::query_as::<_, Tag>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!("SELECT {TAG_COLUMNS} FROM tags WHERE name = $1");
        sqlx::query_as::<_, Tag>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Resolve names to ids. Unknown names are silently absent from the result.
    pub async fn find_ids_by_names(
        pool: &PgPool,
        names: &[String],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT id FROM tags WHERE name = ANY($1)")
            .bind(names)
            .fetch_all(pool)
            .await
    }

    /// List one page of tags in the requested order.
    pub async fn list(
        pool: &PgPool,
        sort: TagSort,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Tag>, sqlx::Error> {
        let query = format!(
            "SELECT {TAG_COLUMNS} FROM tags ORDER BY {} LIMIT $1 OFFSET $2",
            sort.order_by()
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tags")
            .fetch_one(pool)
            .await
    }

    /// Most-used tags first.
    pub async fn popular(pool: &PgPool, limit: i64) -> Result<Vec<Tag>, sqlx::Error> {
        let query = format!(
            "SELECT {TAG_COLUMNS} FROM tags \
             ORDER BY usage_count DESC, name ASC \
             LIMIT $1"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Substring match on the normalized name, most-used first.
    ///
    /// `escaped` must already have `LIKE` wildcards escaped with `\`.
    pub async fn search(pool: &PgPool, escaped: &str, limit: i64) -> Result<Vec<Tag>, sqlx::Error> {
        let pattern = format!("%{escaped}%");
        let query = format!(
            "SELECT {TAG_COLUMNS} FROM tags \
             WHERE name LIKE $1 ESCAPE '\\' \
             ORDER BY usage_count DESC, name ASC \
             LIMIT $2"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(&pattern)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Update a tag's name and/or description.
    ///
    /// Returns `None` if no tag with the given ID exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!(
            "UPDATE tags SET \
                 name = COALESCE($2, name), \
                 description = COALESCE($3, description) \
             WHERE id = $1 \
             RETURNING {TAG_COLUMNS}"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(id)
            .bind(name)
            .bind(description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a tag by ID. Cascade deletes its `post_tags` rows.
    ///
    /// Returns `true` if a tag was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Post-tag associations (transactional)
    // -----------------------------------------------------------------------

    /// Return the tag with this name, creating it if missing.
    pub async fn get_or_create_in(
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<Tag, sqlx::Error> {
        let insert = format!(
            "INSERT INTO tags (name) VALUES ($1) \
             ON CONFLICT (name) DO NOTHING \
             RETURNING {TAG_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Tag>(&insert)
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?;

        if let Some(tag) = created {
            return Ok(tag);
        }

        let select = format!("SELECT {TAG_COLUMNS} FROM tags WHERE name = $1");
        sqlx::query_as::<_, Tag>(&select)
            .bind(name)
            .fetch_one(&mut *conn)
            .await
    }

    /// Resolve each name to a tag, creating missing ones.
    ///
    /// Names are normalized here; empty names are skipped and duplicates
    /// collapse. Stops at the first failure.
    pub async fn get_or_create_many_in(
        conn: &mut PgConnection,
        names: &[String],
    ) -> Result<Vec<Tag>, sqlx::Error> {
        let mut tags = Vec::new();
        for name in normalize_tag_names(names) {
            tags.push(Self::get_or_create_in(&mut *conn, &name).await?);
        }
        Ok(tags)
    }

    pub async fn increment_usage_in(
        conn: &mut PgConnection,
        tag_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE tags SET usage_count = usage_count + 1 WHERE id = $1")
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Replace a post's tag set: delete every association, then attach the
    /// resolved tags and bump each one's `usage_count`.
    ///
    /// Returns the attached tags in input order.
    pub async fn replace_post_tags_in(
        conn: &mut PgConnection,
        post_id: DbId,
        names: &[String],
    ) -> Result<Vec<TagInfo>, sqlx::Error> {
        sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *conn)
            .await?;

        let tags = Self::get_or_create_many_in(&mut *conn, names).await?;

        for tag in &tags {
            sqlx::query("INSERT INTO post_tags (post_id, tag_id) VALUES ($1, $2)")
                .bind(post_id)
                .bind(tag.id)
                .execute(&mut *conn)
                .await?;
            Self::increment_usage_in(&mut *conn, tag.id).await?;
        }

        Ok(tags
            .into_iter()
            .map(|t| TagInfo {
                id: t.id,
                name: t.name,
            })
            .collect())
    }

    // -----------------------------------------------------------------------
    // Reads for post responses
    // -----------------------------------------------------------------------

    /// Tags attached to one post, by name.
    pub async fn tags_for_post(
        pool: &PgPool,
        post_id: DbId,
    ) -> Result<Vec<TagInfo>, sqlx::Error> {
        sqlx::query_as::<_, TagInfo>(
            "SELECT t.id, t.name FROM post_tags pt \
             JOIN tags t ON t.id = pt.tag_id \
             WHERE pt.post_id = $1 \
             ORDER BY t.name",
        )
        .bind(post_id)
        .fetch_all(pool)
        .await
    }

    /// Tags for a batch of posts in one round trip.
    pub async fn tags_for_posts(
        pool: &PgPool,
        post_ids: &[DbId],
    ) -> Result<Vec<PostTagInfo>, sqlx::Error> {
        sqlx::query_as::<_, PostTagInfo>(
            "SELECT pt.post_id, t.id, t.name FROM post_tags pt \
             JOIN tags t ON t.id = pt.tag_id \
             WHERE pt.post_id = ANY($1) \
             ORDER BY pt.post_id, t.name",
        )
        .bind(post_ids)
        .fetch_all(pool)
        .await
    }
}

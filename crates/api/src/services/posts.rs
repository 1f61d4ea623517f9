//! Post CRUD, listing filters and tag attachment.

use std::collections::HashMap;

use quill_core::error::CoreError;
use quill_core::pagination::{Pagination, DEFAULT_LIMIT};
use quill_core::status::PublicationStatus;
use quill_core::tags::{normalize_tag_names, parse_tag_list, validate_tag_name};
use quill_core::types::DbId;
use quill_core::validation::{validate_not_blank, validate_slug};
use quill_db::models::post::{CreatePost, Post, PostFilter, UpdatePost};
use quill_db::models::post_version::DraftContent;
use quill_db::models::tag::TagInfo;
use quill_db::repositories::post_version_repo::empty_document;
use quill_db::repositories::{PostRepo, TagRepo};
use quill_db::DbPool;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::query::PaginationParams;
use crate::response::PageResponse;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /posts`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(max = 255), custom(function = "validate_not_blank"))]
    pub title: String,
    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,
    #[serde(default)]
    pub content_markdown: String,
    pub content_json: Option<serde_json::Value>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request body for `PUT /posts/{id}`: the full editable content.
///
/// `tags` of `None` keeps the current tags; `Some(vec![])` clears them.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(max = 255), custom(function = "validate_not_blank"))]
    pub title: String,
    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,
    pub content_markdown: String,
    pub content_json: serde_json::Value,
    pub tags: Option<Vec<String>>,
}

/// Request body for `PATCH /posts/{id}`. At least one field must be present.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PatchPostRequest {
    #[validate(length(max = 255), custom(function = "validate_not_blank"))]
    pub title: Option<String>,
    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,
    pub content_markdown: Option<String>,
    pub content_json: Option<serde_json::Value>,
    pub tags: Option<Vec<String>>,
}

impl PatchPostRequest {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.slug.is_none()
            && self.content_markdown.is_none()
            && self.content_json.is_none()
            && self.tags.is_none()
    }

    fn touches_content(&self) -> bool {
        self.title.is_some() || self.content_markdown.is_some() || self.content_json.is_some()
    }
}

/// Query parameters for `GET /posts`.
#[derive(Debug, Default, Deserialize)]
pub struct PostListParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    pub user_id: Option<String>,
    /// `true` restricts the listing to the caller's posts.
    pub mine: Option<String>,
    /// Comma-separated tag names; a post matches if it has any of them.
    pub tags: Option<String>,
    pub status: Option<String>,
}

/// Query parameters for `GET /users/me/posts`.
#[derive(Debug, Default, Deserialize)]
pub struct UserPostParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    pub status: Option<String>,
}

/// A post with its tags, as returned by every post endpoint.
#[derive(Debug, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub tags: Vec<TagInfo>,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

pub struct PostService;

impl PostService {
    /// Create a post owned by `user_id`, with an initial draft and tags.
    pub async fn create(
        pool: &DbPool,
        user_id: DbId,
        input: CreatePostRequest,
    ) -> AppResult<PostDetail> {
        input.validate().map_err(CoreError::from)?;
        let tag_names = checked_tag_names(&input.tags)?;

        let title = input.title.trim().to_string();
        let post_id = PostRepo::create(
            pool,
            &CreatePost {
                user_id,
                title,
                slug: input.slug,
                content_markdown: input.content_markdown,
                content_json: input.content_json.unwrap_or_else(empty_document),
            },
            &tag_names,
        )
        .await?;

        tracing::info!(post_id, user_id, "Post created");

        Self::get(pool, post_id).await
    }

    pub async fn get(pool: &DbPool, id: DbId) -> AppResult<PostDetail> {
        let post = PostRepo::find_by_id(pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound { entity: "Post", id }))?;
        let tags = TagRepo::tags_for_post(pool, id).await?;
        Ok(PostDetail { post, tags })
    }

    /// One page of posts, newest first.
    ///
    /// `caller` is the authenticated user, if any; `mine=true` requires one.
    pub async fn list(
        pool: &DbPool,
        caller: Option<DbId>,
        params: PostListParams,
    ) -> AppResult<PageResponse<PostDetail>> {
        let page = params.pagination.resolve(DEFAULT_LIMIT);
        let mut filter = PostFilter::default();

        if is_truthy(params.mine.as_deref()) {
            let user_id = caller.ok_or_else(|| {
                CoreError::Unauthorized("Authentication is required to list your own posts".into())
            })?;
            filter.user_id = Some(user_id);
        } else if let Some(raw) = params.user_id.as_deref().filter(|s| !s.trim().is_empty()) {
            let user_id = raw
                .trim()
                .parse::<DbId>()
                .map_err(|_| CoreError::Validation(format!("Invalid user_id '{raw}'")))?;
            filter.user_id = Some(user_id);
        }

        filter.status = parse_status(params.status.as_deref())?;

        if let Some(raw) = params.tags.as_deref() {
            let names = parse_tag_list(raw);
            if !names.is_empty() {
                let ids = TagRepo::find_ids_by_names(pool, &names).await?;
                if ids.is_empty() {
                    // None of the requested tags exist, so nothing can match.
                    return Ok(PageResponse {
                        data: Vec::new(),
                        page: page.page,
                        limit: page.limit,
                        total: 0,
                    });
                }
                filter.tag_ids = Some(ids);
            }
        }

        list_page(pool, &filter, page).await
    }

    /// The caller's own posts, drafts included, newest first.
    pub async fn list_for_user(
        pool: &DbPool,
        user_id: DbId,
        params: UserPostParams,
    ) -> AppResult<PageResponse<PostDetail>> {
        let page = params.pagination.resolve(DEFAULT_LIMIT);
        let filter = PostFilter {
            user_id: Some(user_id),
            tag_ids: None,
            status: parse_status(params.status.as_deref())?,
        };
        list_page(pool, &filter, page).await
    }

    /// Replace the post's title and content (`PUT`). The new content lands
    /// in the post's draft; the published version is untouched.
    pub async fn update(
        pool: &DbPool,
        id: DbId,
        caller: DbId,
        input: UpdatePostRequest,
    ) -> AppResult<PostDetail> {
        ensure_owner(pool, id, caller, "You can only update your own posts").await?;
        input.validate().map_err(CoreError::from)?;
        let tag_names = input.tags.as_deref().map(checked_tag_names).transpose()?;

        let title = input.title.trim().to_string();
        let draft = DraftContent {
            title: Some(title.clone()),
            content_markdown: Some(input.content_markdown),
            content_json: Some(input.content_json),
        };

        let updated = PostRepo::update(
            pool,
            id,
            caller,
            &UpdatePost {
                title: Some(title),
                slug: input.slug,
            },
            Some(draft),
            tag_names.as_deref(),
        )
        .await?;
        if !updated {
            return Err(AppError::Core(CoreError::NotFound { entity: "Post", id }));
        }

        tracing::info!(post_id = id, user_id = caller, "Post updated");

        Self::get(pool, id).await
    }

    /// Apply only the supplied fields (`PATCH`).
    pub async fn patch(
        pool: &DbPool,
        id: DbId,
        caller: DbId,
        input: PatchPostRequest,
    ) -> AppResult<PostDetail> {
        ensure_owner(pool, id, caller, "You can only update your own posts").await?;
        if input.is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "At least one field must be provided".into(),
            )));
        }
        input.validate().map_err(CoreError::from)?;
        let tag_names = input.tags.as_deref().map(checked_tag_names).transpose()?;

        let title = input.title.as_deref().map(|t| t.trim().to_string());
        let draft = input.touches_content().then(|| DraftContent {
            title: title.clone(),
            content_markdown: input.content_markdown,
            content_json: input.content_json,
        });

        let updated = PostRepo::update(
            pool,
            id,
            caller,
            &UpdatePost {
                title,
                slug: input.slug,
            },
            draft,
            tag_names.as_deref(),
        )
        .await?;
        if !updated {
            return Err(AppError::Core(CoreError::NotFound { entity: "Post", id }));
        }

        tracing::info!(post_id = id, user_id = caller, "Post patched");

        Self::get(pool, id).await
    }

    /// Delete a post with all of its versions and tag links.
    pub async fn delete(pool: &DbPool, id: DbId, caller: DbId) -> AppResult<()> {
        ensure_owner(pool, id, caller, "You can only delete your own posts").await?;

        if !PostRepo::delete(pool, id).await? {
            return Err(AppError::Core(CoreError::NotFound { entity: "Post", id }));
        }

        tracing::info!(post_id = id, user_id = caller, "Post deleted");

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// 404 if the post does not exist, 403 with `message` if `caller` does not own it.
pub(crate) async fn ensure_owner(
    pool: &DbPool,
    post_id: DbId,
    caller: DbId,
    message: &'static str,
) -> AppResult<()> {
    let owner = PostRepo::find_owner(pool, post_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Post",
            id: post_id,
        }))?;
    if owner != caller {
        return Err(AppError::Core(CoreError::Forbidden(message.into())));
    }
    Ok(())
}

/// Normalize request tag names and reject any that are out of bounds.
fn checked_tag_names(raw: &[String]) -> Result<Vec<String>, CoreError> {
    let names = normalize_tag_names(raw);
    for name in &names {
        validate_tag_name(name)?;
    }
    Ok(names)
}

/// Parse an optional `?status=` value; blank means no filter.
pub(crate) fn parse_status(raw: Option<&str>) -> Result<Option<PublicationStatus>, CoreError> {
    raw.filter(|s| !s.trim().is_empty())
        .map(str::parse::<PublicationStatus>)
        .transpose()
}

async fn list_page(
    pool: &DbPool,
    filter: &PostFilter,
    page: Pagination,
) -> AppResult<PageResponse<PostDetail>> {
    let posts = PostRepo::list(pool, filter, page.limit, page.offset()).await?;
    let total = PostRepo::count(pool, filter).await?;

    Ok(PageResponse {
        data: attach_tags(pool, posts).await?,
        page: page.page,
        limit: page.limit,
        total,
    })
}

fn is_truthy(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|s| s.trim().to_ascii_lowercase()).as_deref(),
        Some("true" | "1" | "yes")
    )
}

/// Load the tags for a page of posts in one query.
async fn attach_tags(pool: &DbPool, posts: Vec<Post>) -> AppResult<Vec<PostDetail>> {
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<DbId> = posts.iter().map(|p| p.id).collect();
    let mut by_post: HashMap<DbId, Vec<TagInfo>> = HashMap::new();
    for row in TagRepo::tags_for_posts(pool, &ids).await? {
        by_post.entry(row.post_id).or_default().push(row.into());
    }

    Ok(posts
        .into_iter()
        .map(|post| {
            let tags = by_post.remove(&post.id).unwrap_or_default();
            PostDetail { post, tags }
        })
        .collect())
}

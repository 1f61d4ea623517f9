//! Tag management and lookup.

use quill_core::error::CoreError;
use quill_core::pagination::{parse_limit, DEFAULT_TAG_LIMIT};
use quill_core::tags::{
    escape_like, normalize_tag_name, validate_tag_description, validate_tag_name,
};
use quill_core::types::DbId;
use quill_db::models::tag::{Tag, TagSort};
use quill_db::repositories::TagRepo;
use quill_db::DbPool;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::query::PaginationParams;
use crate::response::PageResponse;

/// Default size of `GET /tags/popular`.
const DEFAULT_POPULAR_LIMIT: i64 = 10;

/// Request body for `POST /tags`.
#[derive(Debug, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Request body for `PUT /tags/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTagRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Query parameters for `GET /tags`.
#[derive(Debug, Default, Deserialize)]
pub struct TagListParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    /// `name` (default), `usage_count` or `created_at`.
    pub sort: Option<String>,
}

/// Query parameters for `GET /tags/search`.
#[derive(Debug, Default, Deserialize)]
pub struct TagSearchParams {
    pub q: Option<String>,
    pub limit: Option<String>,
}

pub struct TagService;

impl TagService {
    pub async fn create(pool: &DbPool, input: CreateTagRequest) -> AppResult<Tag> {
        let name = normalize_tag_name(&input.name);
        validate_tag_name(&name)?;
        let description = input.description.trim();
        validate_tag_description(description)?;

        if TagRepo::find_by_name(pool, &name).await?.is_some() {
            return Err(tag_exists());
        }
        // A concurrent insert still lands on `uq_tags_name`, which maps to 409.
        let tag = TagRepo::create(pool, &name, description).await?;

        tracing::info!(tag_id = tag.id, name = %tag.name, "Tag created");

        Ok(tag)
    }

    pub async fn list(pool: &DbPool, params: TagListParams) -> AppResult<PageResponse<Tag>> {
        let page = params.pagination.resolve(DEFAULT_TAG_LIMIT);
        let sort = TagSort::from_param(params.sort.as_deref());

        let tags = TagRepo::list(pool, sort, page.limit, page.offset()).await?;
        let total = TagRepo::count(pool).await?;

        Ok(PageResponse {
            data: tags,
            page: page.page,
            limit: page.limit,
            total,
        })
    }

    pub async fn popular(pool: &DbPool, limit: Option<&str>) -> AppResult<Vec<Tag>> {
        let limit = parse_limit(limit, DEFAULT_POPULAR_LIMIT);
        Ok(TagRepo::popular(pool, limit).await?)
    }

    /// Tags whose name contains `q`, most used first. `q` matches literally.
    pub async fn search(pool: &DbPool, params: TagSearchParams) -> AppResult<Vec<Tag>> {
        let query = params
            .q
            .as_deref()
            .map(normalize_tag_name)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| CoreError::Validation("Search query is required".into()))?;
        let limit = parse_limit(params.limit.as_deref(), DEFAULT_TAG_LIMIT);

        Ok(TagRepo::search(pool, &escape_like(&query), limit).await?)
    }

    pub async fn get(pool: &DbPool, id: DbId) -> AppResult<Tag> {
        TagRepo::find_by_id(pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound { entity: "Tag", id }))
    }

    pub async fn update(pool: &DbPool, id: DbId, input: UpdateTagRequest) -> AppResult<Tag> {
        let current = Self::get(pool, id).await?;

        let name = input.name.as_deref().map(normalize_tag_name);
        if let Some(name) = &name {
            validate_tag_name(name)?;
            if *name != current.name && TagRepo::find_by_name(pool, name).await?.is_some() {
                return Err(tag_exists());
            }
        }
        let description = input.description.as_deref().map(str::trim);
        if let Some(description) = description {
            validate_tag_description(description)?;
        }

        let tag = TagRepo::update(pool, id, name.as_deref(), description)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound { entity: "Tag", id }))?;

        tracing::info!(tag_id = id, "Tag updated");

        Ok(tag)
    }

    /// Delete a tag. Its post associations go with it.
    pub async fn delete(pool: &DbPool, id: DbId) -> AppResult<()> {
        if !TagRepo::delete(pool, id).await? {
            return Err(AppError::Core(CoreError::NotFound { entity: "Tag", id }));
        }

        tracing::info!(tag_id = id, "Tag deleted");

        Ok(())
    }
}

fn tag_exists() -> AppError {
    AppError::Core(CoreError::Conflict("Tag already exists".into()))
}

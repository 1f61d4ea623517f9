//! Version workflow: drafts, auto-save and publishing.

use quill_core::error::CoreError;
use quill_core::pagination::DEFAULT_LIMIT;
use quill_core::status::PublicationStatus;
use quill_core::types::DbId;
use quill_core::validation::validate_not_blank;
use quill_db::models::post_version::{
    DraftContent, PostVersion, SavedDraft, VersionContent, VersionFilter,
};
use quill_db::repositories::{PostRepo, PostVersionRepo};
use quill_db::DbPool;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::query::PaginationParams;
use crate::response::PageResponse;
use crate::services::posts::{ensure_owner, parse_status};

/// Request body for `POST /posts/{id}/versions`. Missing fields are taken
/// from the current draft, or from the published version for a new draft.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateVersionRequest {
    #[validate(length(max = 255), custom(function = "validate_not_blank"))]
    pub title: Option<String>,
    pub content_markdown: Option<String>,
    pub content_json: Option<serde_json::Value>,
}

/// Request body for `PUT /versions/{id}` (auto-save).
#[derive(Debug, Deserialize, Validate)]
pub struct AutoSaveRequest {
    #[validate(length(max = 255), custom(function = "validate_not_blank"))]
    pub title: String,
    pub content_markdown: String,
    pub content_json: serde_json::Value,
}

/// Query parameters for `GET /versions`.
#[derive(Debug, Default, Deserialize)]
pub struct VersionListParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    pub author_id: Option<String>,
    pub status: Option<String>,
}

pub struct VersionService;

impl VersionService {
    /// Save a draft for a post the caller owns. At most one draft is kept
    /// per post: an existing draft is overwritten, otherwise one is created.
    pub async fn create_draft(
        pool: &DbPool,
        post_id: DbId,
        caller: DbId,
        input: CreateVersionRequest,
    ) -> AppResult<SavedDraft> {
        ensure_owner(
            pool,
            post_id,
            caller,
            "You can only create versions of your own posts",
        )
        .await?;
        input.validate().map_err(CoreError::from)?;

        let content = DraftContent {
            title: input.title.map(|t| t.trim().to_string()),
            content_markdown: input.content_markdown,
            content_json: input.content_json,
        };
        let saved = PostVersionRepo::save_draft(pool, post_id, caller, content)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Post",
                id: post_id,
            }))?;

        tracing::info!(
            post_id,
            version_id = saved.version.id,
            created = saved.created,
            "Draft saved"
        );

        Ok(saved)
    }

    /// All versions of an existing post, newest first.
    pub async fn list_for_post(pool: &DbPool, post_id: DbId) -> AppResult<Vec<PostVersion>> {
        if PostRepo::find_owner(pool, post_id)
            .await?
            .is_none()
        {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Post",
                id: post_id,
            }));
        }
        Ok(PostVersionRepo::list_for_post(pool, post_id).await?)
    }

    pub async fn get(pool: &DbPool, id: DbId) -> AppResult<PostVersion> {
        PostVersionRepo::find_by_id(pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Version",
                id,
            }))
    }

    pub async fn list(
        pool: &DbPool,
        params: VersionListParams,
    ) -> AppResult<PageResponse<PostVersion>> {
        let page = params.pagination.resolve(DEFAULT_LIMIT);

        let mut filter = VersionFilter::default();
        if let Some(raw) = params.author_id.as_deref().filter(|s| !s.trim().is_empty()) {
            let author_id = raw
                .trim()
                .parse::<DbId>()
                .map_err(|_| CoreError::Validation(format!("Invalid author_id '{raw}'")))?;
            filter.author_id = Some(author_id);
        }
        filter.status = parse_status(params.status.as_deref())?;

        let versions = PostVersionRepo::list(pool, &filter, page.limit, page.offset()).await?;
        let total = PostVersionRepo::count(pool, &filter).await?;

        Ok(PageResponse {
            data: versions,
            page: page.page,
            limit: page.limit,
            total,
        })
    }

    /// Overwrite a draft's content in place. Published versions are immutable.
    pub async fn auto_save(
        pool: &DbPool,
        id: DbId,
        caller: DbId,
        input: AutoSaveRequest,
    ) -> AppResult<PostVersion> {
        let version = Self::get(pool, id).await?;
        if version.author_id != caller {
            return Err(AppError::Core(CoreError::Forbidden(
                "You can only update your own versions".into(),
            )));
        }
        if version.status != PublicationStatus::Draft {
            return Err(not_a_draft());
        }
        input.validate().map_err(CoreError::from)?;

        let content = VersionContent {
            title: input.title.trim().to_string(),
            content_markdown: input.content_markdown,
            content_json: input.content_json,
        };
        // Published between the read above and this write.
        let saved = PostVersionRepo::update_draft_content(pool, id, &content)
            .await?
            .ok_or_else(not_a_draft)?;

        tracing::debug!(version_id = id, user_id = caller, "Draft auto-saved");

        Ok(saved)
    }

    /// Make a version the post's single published version.
    pub async fn publish(pool: &DbPool, id: DbId, caller: DbId) -> AppResult<PostVersion> {
        let version = Self::get(pool, id).await?;
        if version.author_id != caller {
            return Err(AppError::Core(CoreError::Forbidden(
                "You can only publish your own versions".into(),
            )));
        }

        let published = PostVersionRepo::publish(pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Version",
                id,
            }))?;

        tracing::info!(
            version_id = id,
            post_id = published.post_id,
            user_id = caller,
            "Version published"
        );

        Ok(published)
    }
}

fn not_a_draft() -> AppError {
    AppError::Core(CoreError::Conflict(
        "Only draft versions can be auto-saved".into(),
    ))
}

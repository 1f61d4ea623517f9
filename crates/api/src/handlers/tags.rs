//! Handlers for the `/tags` resource.
//!
//! Reads are public; mutations require authentication via [`AuthUser`].

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use quill_core::types::DbId;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::services::tags::{CreateTagRequest, TagListParams, TagSearchParams, UpdateTagRequest};
use crate::services::TagService;
use crate::state::AppState;

/// Query parameters for `GET /tags/popular`.
#[derive(Debug, Default, Deserialize)]
pub struct PopularParams {
    pub limit: Option<String>,
}

/// POST /tags
pub async fn create_tag(
    _auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateTagRequest>,
) -> AppResult<impl IntoResponse> {
    let tag = TagService::create(&state.pool, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(tag).with_message("Tag created successfully")),
    ))
}

/// GET /tags
///
/// Paginated listing; `sort` is `name`, `usage_count` or `created_at`.
pub async fn list_tags(
    State(state): State<AppState>,
    Query(params): Query<TagListParams>,
) -> AppResult<impl IntoResponse> {
    let page = TagService::list(&state.pool, params).await?;
    Ok(Json(page))
}

/// GET /tags/popular
pub async fn popular_tags(
    State(state): State<AppState>,
    Query(params): Query<PopularParams>,
) -> AppResult<impl IntoResponse> {
    let tags = TagService::popular(&state.pool, params.limit.as_deref()).await?;
    Ok(Json(DataResponse::new(tags)))
}

/// GET /tags/search
///
/// Case-insensitive substring match on the tag name.
pub async fn search_tags(
    State(state): State<AppState>,
    Query(params): Query<TagSearchParams>,
) -> AppResult<impl IntoResponse> {
    let tags = TagService::search(&state.pool, params).await?;
    Ok(Json(DataResponse::new(tags)))
}

/// GET /tags/{id}
pub async fn get_tag(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let tag = TagService::get(&state.pool, id).await?;
    Ok(Json(DataResponse::new(tag)))
}

/// PUT /tags/{id}
pub async fn update_tag(
    _auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateTagRequest>,
) -> AppResult<impl IntoResponse> {
    let tag = TagService::update(&state.pool, id, input).await?;

    Ok(Json(
        DataResponse::new(tag).with_message("Tag updated successfully"),
    ))
}

/// DELETE /tags/{id}
pub async fn delete_tag(
    _auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    TagService::delete(&state.pool, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

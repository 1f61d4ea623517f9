//! Handlers for post versions: `/posts/{id}/versions` and `/versions`.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use quill_core::types::DbId;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::services::versions::{AutoSaveRequest, CreateVersionRequest, VersionListParams};
use crate::services::VersionService;
use crate::state::AppState;

/// POST /posts/{id}/versions
///
/// Save the post's draft. 201 when a draft was created, 200 when the
/// existing draft was overwritten.
pub async fn create_version(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(post_id): AppPath<DbId>,
    AppJson(input): AppJson<CreateVersionRequest>,
) -> AppResult<impl IntoResponse> {
    let saved = VersionService::create_draft(&state.pool, post_id, auth.user_id, input).await?;

    let (status, message) = if saved.created {
        (StatusCode::CREATED, "Draft created successfully")
    } else {
        (StatusCode::OK, "Draft updated successfully")
    };
    Ok((
        status,
        Json(DataResponse::new(saved.version).with_message(message)),
    ))
}

/// GET /posts/{id}/versions
pub async fn list_post_versions(
    State(state): State<AppState>,
    AppPath(post_id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let versions = VersionService::list_for_post(&state.pool, post_id).await?;
    Ok(Json(DataResponse::new(versions)))
}

/// GET /versions
///
/// Paginated listing across posts, filterable by `author_id` and `status`.
pub async fn list_versions(
    State(state): State<AppState>,
    Query(params): Query<VersionListParams>,
) -> AppResult<impl IntoResponse> {
    let page = VersionService::list(&state.pool, params).await?;
    Ok(Json(page))
}

/// GET /versions/{id}
pub async fn get_version(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let version = VersionService::get(&state.pool, id).await?;
    Ok(Json(DataResponse::new(version)))
}

/// PUT /versions/{id}
///
/// Auto-save: overwrite a draft's content. Published versions answer 409.
pub async fn auto_save_version(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<AutoSaveRequest>,
) -> AppResult<impl IntoResponse> {
    let version = VersionService::auto_save(&state.pool, id, auth.user_id, input).await?;
    Ok(Json(DataResponse::new(version)))
}

/// PATCH /versions/{id}/publish
pub async fn publish_version(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let version = VersionService::publish(&state.pool, id, auth.user_id).await?;
    Ok(Json(
        DataResponse::new(version).with_message("Version published successfully"),
    ))
}

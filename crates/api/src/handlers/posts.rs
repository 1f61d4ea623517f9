//! Handlers for the `/posts` resource.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use quill_core::types::DbId;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::services::posts::{
    CreatePostRequest, PatchPostRequest, PostListParams, UpdatePostRequest,
};
use crate::services::PostService;
use crate::state::AppState;

/// POST /posts
///
/// Create a post with its initial draft and tags.
pub async fn create_post(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreatePostRequest>,
) -> AppResult<impl IntoResponse> {
    let post = PostService::create(&state.pool, auth.user_id, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(post).with_message("Post created successfully")),
    ))
}

/// GET /posts
///
/// Paginated listing. Authentication is optional and only needed for
/// `mine=true`.
pub async fn list_posts(
    auth: Option<AuthUser>,
    State(state): State<AppState>,
    Query(params): Query<PostListParams>,
) -> AppResult<impl IntoResponse> {
    let caller = auth.map(|a| a.user_id);
    let page = PostService::list(&state.pool, caller, params).await?;
    Ok(Json(page))
}

/// GET /posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let post = PostService::get(&state.pool, id).await?;
    Ok(Json(DataResponse::new(post)))
}

/// PUT /posts/{id}
pub async fn update_post(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdatePostRequest>,
) -> AppResult<impl IntoResponse> {
    let post = PostService::update(&state.pool, id, auth.user_id, input).await?;
    Ok(Json(
        DataResponse::new(post).with_message("Post updated successfully"),
    ))
}

/// PATCH /posts/{id}
pub async fn patch_post(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<PatchPostRequest>,
) -> AppResult<impl IntoResponse> {
    let post = PostService::patch(&state.pool, id, auth.user_id, input).await?;
    Ok(Json(
        DataResponse::new(post).with_message("Post updated successfully"),
    ))
}

/// DELETE /posts/{id}
///
/// Removes the post together with every version and tag link.
pub async fn delete_post(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    PostService::delete(&state.pool, id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

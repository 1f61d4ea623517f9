//! Handlers for the `/users` resource.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use quill_core::types::DbId;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::services::posts::UserPostParams;
use crate::services::users::{CreateUserRequest, UpdateUserRequest};
use crate::services::{PostService, UserService};
use crate::state::AppState;

/// POST /users
///
/// Register an account. Responds 201 with a token so the client is signed
/// in straight away.
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateUserRequest>,
) -> AppResult<impl IntoResponse> {
    let session = UserService::register(&state.pool, &state.config.jwt, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(session).with_message("User created successfully")),
    ))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let user = UserService::get(&state.pool, id).await?;
    Ok(Json(DataResponse::new(user)))
}

/// PATCH /users/{id}
///
/// Partial update of the caller's own account.
pub async fn update_user(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateUserRequest>,
) -> AppResult<impl IntoResponse> {
    let user = UserService::update(&state.pool, id, auth.user_id, input).await?;
    Ok(Json(
        DataResponse::new(user).with_message("User updated successfully"),
    ))
}

/// DELETE /users/{id}
pub async fn delete_user(
    auth: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    UserService::delete(&state.pool, id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/me/posts
///
/// The caller's posts, drafts included. Supports `page`, `limit`, `status`.
pub async fn my_posts(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<UserPostParams>,
) -> AppResult<impl IntoResponse> {
    let page = PostService::list_for_user(&state.pool, auth.user_id, params).await?;
    Ok(Json(page))
}

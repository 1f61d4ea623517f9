//! Handlers for the `/auth` resource.

use axum::extract::State;
use axum::Json;
use quill_db::models::user::User;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::services::users::{AuthResponse, LoginRequest};
use crate::services::UserService;
use crate::state::AppState;

/// POST /auth/login
///
/// Exchange email and password for an access token.
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let session = UserService::login(&state.pool, &state.config.jwt, input).await?;
    Ok(Json(
        DataResponse::new(session).with_message("Login successful"),
    ))
}

/// GET /auth/me
///
/// The account behind the presented token.
pub async fn me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<User>>> {
    let user = UserService::get(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse::new(user)))
}

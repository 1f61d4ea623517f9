use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// POST   /                         -> create_user
/// GET    /me/posts                 -> my_posts
/// GET    /{id}                     -> get_user
/// PATCH  /{id}                     -> update_user
/// DELETE /{id}                     -> delete_user
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(users::create_user))
        .route("/me/posts", get(users::my_posts))
        .route(
            "/{id}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
}

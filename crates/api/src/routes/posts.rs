use axum::routing::get;
use axum::Router;

use crate::handlers::{posts, versions};
use crate::state::AppState;

/// Routes mounted at `/posts`.
///
/// ```text
/// GET    /                         -> list_posts
/// POST   /                         -> create_post
/// GET    /{id}                     -> get_post
/// PUT    /{id}                     -> update_post
/// PATCH  /{id}                     -> patch_post
/// DELETE /{id}                     -> delete_post
/// GET    /{id}/versions            -> list_post_versions
/// POST   /{id}/versions            -> create_version
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(posts::list_posts).post(posts::create_post))
        .route(
            "/{id}",
            get(posts::get_post)
                .put(posts::update_post)
                .patch(posts::patch_post)
                .delete(posts::delete_post),
        )
        .route(
            "/{id}/versions",
            get(versions::list_post_versions).post(versions::create_version),
        )
}

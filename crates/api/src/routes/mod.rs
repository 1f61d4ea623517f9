pub mod auth;
pub mod health;
pub mod posts;
pub mod tags;
pub mod users;
pub mod versions;

use axum::Router;

use crate::state::AppState;

/// Build the API route tree, mounted at the root.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                      login (public)
/// /auth/me                         current user (requires auth)
///
/// /users                           register (public)
/// /users/me/posts                  caller's posts (requires auth)
/// /users/{id}                      get, update, delete (self only)
///
/// /posts                           list (optional auth), create
/// /posts/{id}                      get, replace, patch, delete (owner only)
/// /posts/{id}/versions             list, save draft (owner only)
///
/// /versions                        list
/// /versions/{id}                   get, auto-save (author only)
/// /versions/{id}/publish           publish (author only)
///
/// /tags                            list, create
/// /tags/popular                    most used
/// /tags/search                     substring search
/// /tags/{id}                       get, update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/posts", posts::router())
        .nest("/versions", versions::router())
        .nest("/tags", tags::router())
}

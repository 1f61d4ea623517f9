use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::versions;
use crate::state::AppState;

/// Routes mounted at `/versions`.
///
/// ```text
/// GET    /                         -> list_versions
/// GET    /{id}                     -> get_version
/// PUT    /{id}                     -> auto_save_version
/// PATCH  /{id}/publish             -> publish_version
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(versions::list_versions))
        .route(
            "/{id}",
            get(versions::get_version).put(versions::auto_save_version),
        )
        .route("/{id}/publish", patch(versions::publish_version))
}

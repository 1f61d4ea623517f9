use std::sync::Arc;

use crate::config::ServerConfig;
use crate::middleware::rate_limit::RateLimiter;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: quill_db::DbPool,
    /// Server configuration (JWT settings are read by the auth extractor).
    pub config: Arc<ServerConfig>,
    /// Per-IP request counters shared by every request.
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(pool: quill_db::DbPool, config: ServerConfig) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit));
        Self {
            pool,
            config: Arc::new(config),
            rate_limiter,
        }
    }
}

//! Per-client-IP request limiting.
//!
//! Each client address gets a counter. A request that arrives within
//! `interval` of the client's last allowed request counts against `burst`;
//! once `burst` requests are counted, further requests inside the window
//! are rejected with 429. A request arriving after the window resets the
//! count. Rejected requests do not refresh the window.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::state::AppState;

/// Key used when no client address can be determined.
const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Window measured from the client's last allowed request.
    pub interval: Duration,
    /// Requests allowed within one window.
    pub burst: u32,
}

#[derive(Debug)]
struct Visitor {
    last_seen: Instant,
    requests: u32,
}

/// Mutex-guarded map of client key to counter.
///
/// The lock is only held for map lookups, never across an `.await`.
#[derive(Debug)]
pub struct RateLimiter {
    visitors: Mutex<HashMap<String, Visitor>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            visitors: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Record a request from `client` and report whether it is allowed.
    pub fn check(&self, client: &str) -> bool {
        self.check_at(client, Instant::now())
    }

    /// [`check`](Self::check) with an explicit clock reading.
    pub fn check_at(&self, client: &str, now: Instant) -> bool {
        let mut visitors = self.lock();

        let Some(visitor) = visitors.get_mut(client) else {
            visitors.insert(
                client.to_string(),
                Visitor {
                    last_seen: now,
                    requests: 1,
                },
            );
            return true;
        };

        if now.saturating_duration_since(visitor.last_seen) < self.config.interval {
            if visitor.requests >= self.config.burst {
                return false;
            }
            visitor.requests += 1;
        } else {
            visitor.requests = 1;
        }
        visitor.last_seen = now;
        true
    }

    /// Drop clients whose last allowed request is older than `max_idle`.
    ///
    /// Returns how many entries were removed.
    pub fn evict_idle(&self, now: Instant, max_idle: Duration) -> usize {
        let mut visitors = self.lock();
        let before = visitors.len();
        visitors.retain(|_, v| now.saturating_duration_since(v.last_seen) <= max_idle);
        before - visitors.len()
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Visitor>> {
        // A panic while holding the lock cannot leave a counter half-written.
        self.visitors.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Axum middleware applying [`AppState::rate_limiter`] to every request.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let client = client_key(&request);

    if !state.rate_limiter.check(&client) {
        tracing::warn!(client = %client, path = %request.uri().path(), "Rate limit exceeded");
        return AppError::TooManyRequests.into_response();
    }

    next.run(request).await
}

/// Identify the client: first `X-Forwarded-For` hop, then `X-Real-IP`, then
/// the socket peer address.
fn client_key(request: &Request) -> String {
    let headers = request.headers();

    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = real_ip {
        return ip.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

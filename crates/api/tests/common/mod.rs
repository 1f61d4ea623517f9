#![allow(dead_code)]

use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use quill_api::auth::jwt::JwtConfig;
use quill_api::config::ServerConfig;
use quill_api::middleware::rate_limit::RateLimitConfig;
use quill_api::router::build_app_router;
use quill_api::state::AppState;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults.
///
/// The rate limiter is effectively disabled so that tests issuing many
/// requests from the shared `unknown` client bucket are not throttled.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: String::new(),
        db_max_connections: 5,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        rate_limit: RateLimitConfig {
            interval: Duration::from_millis(100),
            burst: u32::MAX,
        },
        jwt: JwtConfig {
            secret: "test-secret-do-not-use".to_string(),
            expiry_hours: 1,
        },
    }
}

/// Build the full application router, exactly as `main.rs` does.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_with_config(pool, test_config())
}

pub fn build_app_with_config(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState::new(pool, config.clone());
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).expect("request should build"))
        .await
        .expect("router is infallible")
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn patch_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::PATCH, uri, Some(token), None).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Register a user through the API; returns `(user_id, token)`.
pub async fn create_user_and_token(app: &Router, name: &str) -> (i64, String) {
    let body = json!({
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
        "password": TEST_PASSWORD,
    });
    let response = post_json(app.clone(), "/users", body).await;
    assert_eq!(response.status(), StatusCode::CREATED, "registration should succeed");

    let json = body_json(response).await;
    let id = json["data"]["user"]["id"].as_i64().expect("user id");
    let token = json["data"]["token"].as_str().expect("token").to_string();
    (id, token)
}

/// Create a post through the API; returns the response `data` object.
pub async fn create_post(app: &Router, token: &str, body: Value) -> Value {
    let response = post_json_auth(app.clone(), "/posts", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED, "post creation should succeed");
    body_json(response).await["data"].clone()
}

//! End-to-end tests for the per-IP rate limiter.

mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use common::body_json;
use quill_api::middleware::rate_limit::RateLimitConfig;
use sqlx::PgPool;
use tower::ServiceExt;

fn limited_app(pool: PgPool) -> Router {
    let mut config = common::test_config();
    config.rate_limit = RateLimitConfig {
        interval: Duration::from_millis(100),
        burst: 5,
    };
    common::build_app_with_config(pool, config)
}

async fn get_from(app: Router, ip: &str) -> StatusCode {
    let request = Request::builder()
        .uri("/tags")
        .header("x-forwarded-for", ip)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap().status()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn sixth_immediate_request_is_limited(pool: PgPool) {
    let app = limited_app(pool);

    for i in 1..=5 {
        assert_eq!(
            get_from(app.clone(), "203.0.113.7").await,
            StatusCode::OK,
            "request {i} should pass"
        );
    }

    let request = Request::builder()
        .uri("/tags")
        .header("x-forwarded-for", "203.0.113.7")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = body_json(response).await;
    assert_eq!(json["code"], "RATE_LIMITED");
    assert_eq!(json["error"], "Too many requests");

    // Other clients are unaffected.
    assert_eq!(get_from(app.clone(), "198.51.100.2").await, StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(get_from(app, "203.0.113.7").await, StatusCode::OK);
}

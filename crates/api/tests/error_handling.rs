//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values and need no
//! database.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use quill_api::error::{AppError, ErrorDetail};
use quill_core::error::CoreError;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Post",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Post with id 42 not found");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation("title: must not be blank".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "title: must not be blank");
}

#[tokio::test]
async fn unauthorized_and_forbidden_keep_their_messages() {
    let (status, json) = error_to_response(AppError::Core(CoreError::Unauthorized(
        "Invalid email or password".into(),
    )))
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Invalid email or password");

    let (status, json) = error_to_response(AppError::Core(CoreError::Forbidden(
        "You can only update your own posts".into(),
    )))
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
    assert_eq!(json["error"], "You can only update your own posts");
}

#[tokio::test]
async fn conflict_error_returns_409() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Conflict("Tag already exists".into()))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn too_many_requests_returns_429() {
    let (status, json) = error_to_response(AppError::TooManyRequests).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["code"], "RATE_LIMITED");
    assert_eq!(json["error"], "Too many requests");
}

#[tokio::test]
async fn row_not_found_returns_404() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn internal_errors_are_sanitized() {
    let err = AppError::InternalError("connection string postgres://secret".into());
    let response = err.into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let detail = response
        .extensions()
        .get::<ErrorDetail>()
        .expect("5xx responses carry the detail for logging")
        .0
        .clone();
    assert!(detail.contains("postgres://secret"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn client_errors_carry_no_detail() {
    let response = AppError::BadRequest("bad".into()).into_response();
    assert!(response.extensions().get::<ErrorDetail>().is_none());
}

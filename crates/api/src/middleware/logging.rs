//! Response logging for failed requests.
//!
//! Successful traffic is left to the DEBUG-level trace layer. This layer
//! logs 5xx responses at ERROR (with the detail [`AppError`] attached),
//! other 4xx responses at WARN, and any non-success `/health` response so a
//! failing probe shows up even though health checks are otherwise quiet.
//!
//! [`AppError`]: crate::error::AppError

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ErrorDetail;

/// Axum middleware; see the module docs.
pub async fn log_failed_responses(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;
    let status = response.status();

    if !should_log(&path, status) {
        return response;
    }

    let detail = response
        .extensions()
        .get::<ErrorDetail>()
        .map(|d| d.0.as_str())
        .unwrap_or("");

    if status.is_server_error() {
        tracing::error!(%method, %path, status = status.as_u16(), detail, "Request failed");
    } else {
        tracing::warn!(%method, %path, status = status.as_u16(), "Request rejected");
    }

    response
}

fn should_log(path: &str, status: StatusCode) -> bool {
    if path == "/health" {
        return !status.is_success();
    }
    status.is_client_error() || status.is_server_error()
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password gate for the greeting endpoint.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Alternative header carrying the password.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Middleware that requires the configured password.
///
/// Accepts `Authorization: Bearer <password>` or `x-api-key: <password>`.
pub async fn require_password(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let headers = request.headers();
    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .or_else(|| headers.get(API_KEY_HEADER).and_then(|h| h.to_str().ok()));

    let authorized = provided.is_some_and(|p| constant_time_compare(p, &state.password));

    if authorized {
        return next.run(request).await;
    }

    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({ "error": "unauthorized" })),
    )
        .into_response()
}

/// Constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("hunter2", "hunter2"));
        assert!(!constant_time_compare("hunter2", "hunter3"));
        assert!(!constant_time_compare("short", "much-longer-password"));
        assert!(!constant_time_compare("", "not-empty"));
    }
}

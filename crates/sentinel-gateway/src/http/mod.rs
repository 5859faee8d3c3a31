pub mod health;
pub mod history;
pub mod retention;
pub mod webhooks;

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::app::AppState;

/// Shared `X-API-Key` gate for every history/analytics/retention endpoint.
/// Returns `Some(response)` when the request should be rejected.
pub fn api_key_gate(state: &AppState, headers: &HeaderMap) -> Option<Response> {
    let presented = headers.get("x-api-key").and_then(|v| v.to_str().ok());
    let ok = presented
        .map(|k| crate::auth::verify_api_key(k, &state.config.security.api_key_secret))
        .unwrap_or(false);
    if ok {
        None
    } else {
        Some((StatusCode::UNAUTHORIZED, Json(json!({"error": "authentication failed"}))).into_response())
    }
}

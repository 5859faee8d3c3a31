use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::AppState;

/// GET /health — liveness probe. `degraded` when the hot store is
/// unreachable; the database isn't checked here since a DB outage is
/// already visible through every other endpoint's error responses.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let hot_store_ok = state.rate_limiter.ping().await;

    let status = if hot_store_ok { "healthy" } else { "degraded" };

    Json(json!({
        "status": status,
        "services": {
            "hot_store": if hot_store_ok { "ok" } else { "unreachable" },
        },
    }))
}

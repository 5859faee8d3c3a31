use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use sentinel_core::types::TenantId;
use sentinel_retention::RetentionPolicy;

use crate::app::AppState;
use crate::http::api_key_gate;

#[derive(Debug, Deserialize)]
pub struct CompanyQuery {
    pub company_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CleanupRequest {
    pub messages_retention_days: i64,
    pub sessions_retention_days: i64,
}

pub async fn cleanup(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(q): Query<CompanyQuery>,
    Json(req): Json<CleanupRequest>,
) -> Response {
    if let Some(denied) = api_key_gate(&state, &headers) {
        return denied;
    }
    let tenant_id = TenantId::from(q.company_id);
    let policy = RetentionPolicy::clamped(
        req.messages_retention_days,
        req.sessions_retention_days,
        &state.config.retention,
    );
    match sentinel_retention::cleanup_tenant(&state.history, &tenant_id, policy, state.config.retention.batch_size).await
    {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "cleanup failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "internal error"}))).into_response()
        }
    }
}

pub async fn cleanup_estimate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(q): Query<CompanyQuery>,
    Json(req): Json<CleanupRequest>,
) -> Response {
    if let Some(denied) = api_key_gate(&state, &headers) {
        return denied;
    }
    let tenant_id = TenantId::from(q.company_id);
    let policy = RetentionPolicy::clamped(
        req.messages_retention_days,
        req.sessions_retention_days,
        &state.config.retention,
    );
    match sentinel_retention::estimate(&state.history, &tenant_id, policy).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "cleanup estimate failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "internal error"}))).into_response()
        }
    }
}

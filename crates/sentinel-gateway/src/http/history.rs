//! Read-only history and analytics endpoints. All require `X-API-Key`.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use sentinel_core::types::{ChannelKind, SessionState, TenantId};
use sentinel_history::{MessageFilter, Page, SessionFilter};

use crate::app::AppState;
use crate::http::api_key_gate;

#[derive(Debug, Deserialize)]
pub struct SessionsQuery {
    pub company_id: String,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub per_page: Option<i64>,
    pub channel: Option<ChannelKind>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

fn parse_date(s: &Option<String>) -> Option<chrono::DateTime<chrono::Utc>> {
    s.as_deref().and_then(|s| s.parse().ok())
}

/// GET /sessions — paginated session snapshots.
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
    Query(q): Query<SessionsQuery>,
) -> Response {
    if let Some(denied) = api_key_gate(&state, &headers) {
        return denied;
    }
    let tenant_id = TenantId::from(q.company_id);
    let per_page = q.per_page.unwrap_or(50);
    let page = Page::new(per_page, (q.page.unwrap_or(1) - 1).max(0) * per_page);
    let filter = SessionFilter {
        channel_kind: q.channel,
        state: q.state.as_deref().and_then(|s| s.parse::<SessionState>().ok()),
        start_date: parse_date(&q.start_date),
        end_date: parse_date(&q.end_date),
    };
    match state.history.list_sessions(&tenant_id, &filter, page).await {
        Ok(rows) => (StatusCode::OK, Json(json!({"sessions": rows, "page": q.page.unwrap_or(1)}))).into_response(),
        Err(e) => internal_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct GetSessionQuery {
    pub company_id: String,
}

/// GET /sessions/{id} — a session with its embedded messages.
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
    Path(id): Path<String>,
    Query(q): Query<GetSessionQuery>,
) -> Response {
    if let Some(denied) = api_key_gate(&state, &headers) {
        return denied;
    }
    let tenant_id = TenantId::from(q.company_id);
    let session = match state.history.get_session(&tenant_id, &id).await {
        Ok(row) => row,
        Err(e) => return internal_error(e),
    };

    let message_filter = MessageFilter { channel_kind: None, session_id: Some(id.clone()), is_from_bot: None };
    let messages = match state.history.list_messages(&tenant_id, &message_filter, Page::new(500, 0)).await {
        Ok(rows) => rows,
        Err(e) => return internal_error(e),
    };

    match session {
        Some(session) => (StatusCode::OK, Json(json!({"session": session, "messages": messages}))).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"error": "session not found"}))).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    pub company_id: String,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub per_page: Option<i64>,
    pub channel: Option<ChannelKind>,
    pub session_id: Option<String>,
    pub is_from_bot: Option<bool>,
}

pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
    Query(q): Query<MessagesQuery>,
) -> Response {
    if let Some(denied) = api_key_gate(&state, &headers) {
        return denied;
    }
    let tenant_id = TenantId::from(q.company_id);
    let per_page = q.per_page.unwrap_or(50);
    let page = Page::new(per_page, (q.page.unwrap_or(1) - 1).max(0) * per_page);
    let filter = MessageFilter { channel_kind: q.channel, session_id: q.session_id, is_from_bot: q.is_from_bot };
    match state.history.list_messages(&tenant_id, &filter, page).await {
        Ok(rows) => (StatusCode::OK, Json(json!({"messages": rows}))).into_response(),
        Err(e) => internal_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub company_id: String,
}

pub async fn analytics(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
    Query(q): Query<AnalyticsQuery>,
) -> Response {
    if let Some(denied) = api_key_gate(&state, &headers) {
        return denied;
    }
    let tenant_id = TenantId::from(q.company_id);
    match sentinel_history::tenant_analytics(&state.history, &tenant_id).await {
        Ok(a) => (StatusCode::OK, Json(a)).into_response(),
        Err(e) => internal_error(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct DailyAnalyticsQuery {
    pub company_id: String,
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_days() -> i64 {
    30
}

pub async fn analytics_daily(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
    Query(q): Query<DailyAnalyticsQuery>,
) -> Response {
    if let Some(denied) = api_key_gate(&state, &headers) {
        return denied;
    }
    let tenant_id = TenantId::from(q.company_id);
    match state.history.daily_message_counts(&tenant_id, q.days).await {
        Ok(series) => (StatusCode::OK, Json(json!({"daily": series}))).into_response(),
        Err(e) => internal_error(e),
    }
}

fn internal_error(e: impl std::fmt::Display) -> Response {
    tracing::warn!(error = %e, "history query failed");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "internal error"}))).into_response()
}

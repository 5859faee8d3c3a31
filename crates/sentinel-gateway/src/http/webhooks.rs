//! Channel ingress — token-keyed webhook endpoints plus the generic and
//! internal entry points. Every handler follows the same shape: rate limit,
//! resolve the tenant, parse the channel-specific payload into a neutral
//! message, hand it to the orchestrator, and acknowledge.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{ConnectInfo, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tracing::{info, warn};

use sentinel_core::types::{ChannelKind, MessageKind, TenantId};
use sentinel_orchestrator::InboundMessage;
use sentinel_tenants::ResolveOutcome;

use crate::app::AppState;
use crate::rate_limit::{identifier_for, limit_for, LimitClass};

fn rate_limited_response(limit: u32, remaining: u32, reset: u64) -> Response {
    let mut resp = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({"error": "rate limit exceeded"})),
    )
        .into_response();
    let headers = resp.headers_mut();
    headers.insert("x-ratelimit-limit", limit.into());
    headers.insert("x-ratelimit-remaining", remaining.into());
    headers.insert("x-ratelimit-reset", reset.into());
    headers.insert("retry-after", reset.into());
    resp
}

async fn rate_limit_gate(
    state: &AppState,
    class: LimitClass,
    headers: &HeaderMap,
    peer: SocketAddr,
) -> Option<Response> {
    if !state.config.rate_limit.enabled {
        return None;
    }
    let api_key = headers.get("x-api-key").and_then(|v| v.to_str().ok());
    let forwarded = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok());
    let id = identifier_for(api_key, forwarded, &peer.ip().to_string());
    let limit = limit_for(class, &state.config.rate_limit);
    let outcome = state.rate_limiter.check(&id, limit).await;
    if !outcome.allowed {
        return Some(rate_limited_response(outcome.limit, outcome.remaining, outcome.reset_secs));
    }
    None
}

fn signature_gate(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Option<Response> {
    if !state.config.security.webhook_signature_required {
        return None;
    }
    match crate::auth::verify_webhook_signature(headers, body, &state.config.security.webhook_secret) {
        Ok(()) => None,
        Err(e) => {
            warn!(error = %e, "webhook signature rejected");
            Some((StatusCode::UNAUTHORIZED, Json(json!({"error": "authentication failed"}))).into_response())
        }
    }
}

async fn resolve_tenant(state: &AppState, token: &str) -> Result<TenantId, StatusCode> {
    match state.tenant_registry.resolve_by_webhook_token(token).await {
        Ok(ResolveOutcome::Found(channel)) => Ok(channel.tenant_id),
        Ok(ResolveOutcome::NotFound) => {
            warn!(error_class = "channel_not_found", "unknown webhook token");
            Err(StatusCode::NOT_FOUND)
        }
        Ok(ResolveOutcome::Inactive) => Err(StatusCode::FORBIDDEN),
        Err(e) => {
            warn!(error = %e, "tenant lookup failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

// ── Telegram ──────────────────────────────────────────────────────────────

pub async fn telegram_webhook(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Path(token): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(blocked) = rate_limit_gate(&state, LimitClass::Webhook, &headers, peer).await {
        return blocked;
    }
    if let Some(blocked) = signature_gate(&state, &headers, &body) {
        return blocked;
    }
    let tenant_id = match resolve_tenant(&state, &token).await {
        Ok(t) => t,
        Err(code) => return code.into_response(),
    };

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(_) => return (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid JSON body"}))).into_response(),
    };

    let message = &payload["message"];
    let from_id = message["from"]["id"].as_i64().or_else(|| message["chat"]["id"].as_i64());
    let Some(from_id) = from_id else {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "missing sender id"}))).into_response();
    };

    let inbound = InboundMessage {
        tenant_id: Some(tenant_id),
        channel_kind: ChannelKind::Telegram,
        external_user_id: from_id.to_string(),
        kind: MessageKind::Text,
        text: message["text"].as_str().map(String::from),
        media_url: None,
        from_user_name: message["from"]["first_name"].as_str().map(String::from),
    };

    state.orchestrator.handle_message(inbound).await;
    info!(channel = "telegram", "webhook accepted");
    (StatusCode::OK, Json(json!({"ok": true}))).into_response()
}

// ── WhatsApp ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct WhatsAppVerifyQuery {
    #[serde(rename = "hub.mode")]
    pub hub_mode: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub hub_challenge: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub hub_verify_token: Option<String>,
}

pub async fn whatsapp_verify(
    State(state): State<Arc<AppState>>,
    Query(q): Query<WhatsAppVerifyQuery>,
) -> Response {
    if q.hub_mode.as_deref() == Some("subscribe")
        && q.hub_verify_token.as_deref() == Some(state.config.security.webhook_secret.as_str())
    {
        if let Some(challenge) = q.hub_challenge.and_then(|c| c.parse::<i64>().ok()) {
            return (StatusCode::OK, challenge.to_string()).into_response();
        }
    }
    StatusCode::FORBIDDEN.into_response()
}

pub async fn whatsapp_webhook(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Path(token): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(blocked) = rate_limit_gate(&state, LimitClass::Webhook, &headers, peer).await {
        return blocked;
    }
    if let Some(blocked) = signature_gate(&state, &headers, &body) {
        return blocked;
    }
    let tenant_id = match resolve_tenant(&state, &token).await {
        Ok(t) => t,
        Err(code) => return code.into_response(),
    };

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(_) => return (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid JSON body"}))).into_response(),
    };

    let messages = payload["entry"]
        .as_array()
        .into_iter()
        .flatten()
        .flat_map(|entry| entry["changes"].as_array().cloned().unwrap_or_default())
        .flat_map(|change| change["value"]["messages"].as_array().cloned().unwrap_or_default())
        .collect::<Vec<_>>();

    let Some(msg) = messages.into_iter().next() else {
        // No message payload (status/delivery callback) — acknowledge, nothing to do.
        return (StatusCode::OK, Json(json!({"ok": true}))).into_response();
    };

    let Some(from) = msg["from"].as_str() else {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "missing sender id"}))).into_response();
    };

    let inbound = InboundMessage {
        tenant_id: Some(tenant_id),
        channel_kind: ChannelKind::Whatsapp,
        external_user_id: from.to_string(),
        kind: MessageKind::Text,
        text: msg["text"]["body"].as_str().map(String::from),
        media_url: None,
        from_user_name: None,
    };

    state.orchestrator.handle_message(inbound).await;
    info!(channel = "whatsapp", "webhook accepted");
    (StatusCode::OK, Json(json!({"ok": true}))).into_response()
}

// ── Generic ingress / internal ───────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenericIngressRequest {
    pub session_id: Option<String>,
    pub user_id: String,
    pub channel: ChannelKind,
    pub text: String,
    pub user_name: Option<String>,
    #[serde(default)]
    pub metadata: Value,
}

/// Generic channel ingress. Unauthenticated, like the webhook endpoints —
/// gated only by rate limiting, not `X-API-Key` (that gate is reserved for
/// the history/analytics/retention surface). The request body carries no
/// tenant field, so an optional `X-Tenant-Id` header resolves it; with none
/// given, the request is still accepted and acknowledged, same as the
/// webhook endpoints acknowledge once a payload is accepted.
pub async fn generic_ingress(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<GenericIngressRequest>,
) -> Response {
    if let Some(blocked) = rate_limit_gate(&state, LimitClass::Default, &headers, peer).await {
        return blocked;
    }

    let tenant_id = headers.get("x-tenant-id").and_then(|v| v.to_str().ok()).map(TenantId::from);

    let Some(tenant_id) = tenant_id else {
        return (StatusCode::OK, Json(json!({"accepted": true}))).into_response();
    };

    let inbound = InboundMessage {
        tenant_id: Some(tenant_id),
        channel_kind: req.channel,
        external_user_id: req.user_id,
        kind: MessageKind::Text,
        text: Some(req.text),
        media_url: None,
        from_user_name: req.user_name,
    };

    let reply = state.orchestrator.handle_message(inbound).await;
    (StatusCode::OK, Json(serde_json::to_value(reply).unwrap_or_default())).into_response()
}

/// POST /process — internal agent endpoint: neutral message in, reply out.
/// Same contract as `generic_ingress` but intended for trusted callers
/// (an upstream channel adapter service) rather than end-client traffic.
pub async fn process_internal(
    State(state): State<Arc<AppState>>,
    Json(inbound): Json<InboundMessage>,
) -> Json<Value> {
    let reply = state.orchestrator.handle_message(inbound).await;
    Json(serde_json::to_value(reply).unwrap_or_default())
}

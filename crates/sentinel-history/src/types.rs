use chrono::{DateTime, Utc};
use sentinel_core::types::{ChannelKind, MessageKind, SessionState, TenantId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: uuid::Uuid,
    pub tenant_id: TenantId,
    pub session_id: String,
    pub channel_kind: ChannelKind,
    pub kind: MessageKind,
    pub text: Option<String>,
    pub media_url: Option<String>,
    pub is_from_bot: bool,
    pub from_user_id: Option<String>,
    pub from_user_name: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl MessageRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tenant_id: TenantId,
        session_id: impl Into<String>,
        channel_kind: ChannelKind,
        kind: MessageKind,
        text: Option<String>,
        is_from_bot: bool,
        from_user_id: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::now_v7(),
            tenant_id,
            session_id: session_id.into(),
            channel_kind,
            kind,
            text,
            media_url: None,
            is_from_bot,
            from_user_id,
            from_user_name: None,
            metadata: serde_json::json!({}),
            created_at: Utc::now(),
        }
    }
}

/// Durable snapshot of session state, separate from the hot-store copy in
/// `sentinel-sessions`. `created_at` is preserved across every upsert —
/// only `state`/`context`/`last_activity` move forward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub tenant_id: TenantId,
    pub external_user_id: String,
    pub channel_kind: ChannelKind,
    pub state: SessionState,
    pub context: serde_json::Value,
    pub crm_client_ref: Option<String>,
    pub crm_appointment_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    pub channel_kind: Option<ChannelKind>,
    pub session_id: Option<String>,
    pub is_from_bot: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub channel_kind: Option<ChannelKind>,
    pub state: Option<SessionState>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.clamp(1, 500),
            offset: offset.max(0),
        }
    }
}

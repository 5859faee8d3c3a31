use chrono::{DateTime, Utc};
use sentinel_core::types::{ChannelKind, SessionId, SessionState, TenantId};
use serde::{Deserialize, Serialize};

/// Structured context bag carried alongside a session.
///
/// Grows by accretion as the conversation progresses through the state
/// machine; never reset except on explicit session deletion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionContext {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub desired_service: Option<String>,
    pub selected_slot: Option<String>,
    pub appointment_id: Option<String>,
    /// Results stashed by the most recent tool dispatch, keyed by tool name.
    #[serde(default)]
    pub function_results: serde_json::Map<String, serde_json::Value>,
}

impl SessionContext {
    /// `{name, phone, desired_service}` all present — the gate for
    /// `COLLECTING_INFO -> BOOKING`.
    pub fn has_booking_essentials(&self) -> bool {
        self.name.is_some() && self.phone.is_some() && self.desired_service.is_some()
    }

    /// Any of `{desired_service, name, phone}` present — the gate for
    /// `GREETING -> COLLECTING_INFO`.
    pub fn has_any_lead(&self) -> bool {
        self.name.is_some() || self.phone.is_some() || self.desired_service.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub tenant_id: TenantId,
    pub external_user_id: String,
    pub channel_kind: ChannelKind,
    pub state: SessionState,
    pub context: SessionContext,
    pub crm_client_ref: Option<String>,
    pub crm_appointment_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub ttl_secs: u64,
}

impl Session {
    /// A brand-new session for a channel/external-user pair that has no
    /// live entry in the hot store. Always starts `INITIATED`.
    pub fn fresh(
        tenant_id: TenantId,
        channel_kind: ChannelKind,
        external_user_id: impl Into<String>,
        ttl_secs: u64,
    ) -> Self {
        let external_user_id = external_user_id.into();
        let now = Utc::now();
        Self {
            id: SessionId::for_channel(channel_kind, &external_user_id),
            tenant_id,
            external_user_id,
            channel_kind,
            state: SessionState::Initiated,
            context: SessionContext::default(),
            crm_client_ref: None,
            crm_appointment_ref: None,
            created_at: now,
            last_activity: now,
            ttl_secs,
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}

/// One turn of the bounded hot-store conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: HistoryRole,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryRole {
    User,
    Model,
}

impl std::fmt::Display for HistoryRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryRole::User => write!(f, "user"),
            HistoryRole::Model => write!(f, "model"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_starts_initiated() {
        let s = Session::fresh(TenantId::from("t1"), ChannelKind::Telegram, "42", 1800);
        assert_eq!(s.state, SessionState::Initiated);
        assert_eq!(s.id.as_str(), "tg_42");
    }

    #[test]
    fn booking_essentials_requires_all_three() {
        let mut ctx = SessionContext::default();
        assert!(!ctx.has_booking_essentials());
        ctx.name = Some("Alice".into());
        ctx.phone = Some("+1".into());
        assert!(!ctx.has_booking_essentials());
        ctx.desired_service = Some("haircut".into());
        assert!(ctx.has_booking_essentials());
    }

    #[test]
    fn any_lead_is_satisfied_by_a_single_field() {
        let mut ctx = SessionContext::default();
        assert!(!ctx.has_any_lead());
        ctx.phone = Some("+1".into());
        assert!(ctx.has_any_lead());
    }
}

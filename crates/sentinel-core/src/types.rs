use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Tenant identifier (UUIDv7 — time-sortable for log correlation).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TenantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Channel identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ChannelId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Session identifier. Channel-stable: `<channel-prefix>_<external_user_id>`,
/// e.g. `tg_42`, `wa_79001234567`. Not a UUID — deliberately deterministic so
/// the same end-user always resolves to the same session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn for_channel(channel_kind: ChannelKind, external_user_id: &str) -> Self {
        Self(format!("{}_{}", channel_kind.prefix(), external_user_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Delivery channel a message arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Telegram,
    Whatsapp,
    Voice,
    Web,
}

impl ChannelKind {
    /// Prefix used when deriving a channel-stable session id.
    pub fn prefix(&self) -> &'static str {
        match self {
            ChannelKind::Telegram => "tg",
            ChannelKind::Whatsapp => "wa",
            ChannelKind::Voice => "vc",
            ChannelKind::Web => "web",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKind::Telegram => write!(f, "telegram"),
            ChannelKind::Whatsapp => write!(f, "whatsapp"),
            ChannelKind::Voice => write!(f, "voice"),
            ChannelKind::Web => write!(f, "web"),
        }
    }
}

impl FromStr for ChannelKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "telegram" => Ok(ChannelKind::Telegram),
            "whatsapp" => Ok(ChannelKind::Whatsapp),
            "voice" => Ok(ChannelKind::Voice),
            "web" => Ok(ChannelKind::Web),
            other => Err(format!("unknown channel kind: {other}")),
        }
    }
}

/// Shape of a single message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Audio,
    Image,
    Video,
    Document,
    Location,
    Contact,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageKind::Text => "text",
            MessageKind::Audio => "audio",
            MessageKind::Image => "image",
            MessageKind::Video => "video",
            MessageKind::Document => "document",
            MessageKind::Location => "location",
            MessageKind::Contact => "contact",
        };
        write!(f, "{s}")
    }
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "text" => Ok(MessageKind::Text),
            "audio" => Ok(MessageKind::Audio),
            "image" => Ok(MessageKind::Image),
            "video" => Ok(MessageKind::Video),
            "document" => Ok(MessageKind::Document),
            "location" => Ok(MessageKind::Location),
            "contact" => Ok(MessageKind::Contact),
            other => Err(format!("unknown message kind: {other}")),
        }
    }
}

/// Finite states of a dialogue session. Transitions are monotone along the
/// happy path — see sentinel-orchestrator for the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Initiated,
    Greeting,
    CollectingInfo,
    Consulting,
    Booking,
    Confirming,
    Completed,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Initiated => "initiated",
            SessionState::Greeting => "greeting",
            SessionState::CollectingInfo => "collecting_info",
            SessionState::Consulting => "consulting",
            SessionState::Booking => "booking",
            SessionState::Confirming => "confirming",
            SessionState::Completed => "completed",
            SessionState::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

impl FromStr for SessionState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "initiated" => Ok(SessionState::Initiated),
            "greeting" => Ok(SessionState::Greeting),
            "collecting_info" => Ok(SessionState::CollectingInfo),
            "consulting" => Ok(SessionState::Consulting),
            "booking" => Ok(SessionState::Booking),
            "confirming" => Ok(SessionState::Confirming),
            "completed" => Ok(SessionState::Completed),
            "failed" => Ok(SessionState::Failed),
            other => Err(format!("unknown session state: {other}")),
        }
    }
}

/// Subscription plan. Drives the retention policy (sentinel-retention) and
/// can later drive rate-limit tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    #[default]
    Free,
    Starter,
    Pro,
    Enterprise,
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Plan::Free => "free",
            Plan::Starter => "starter",
            Plan::Pro => "pro",
            Plan::Enterprise => "enterprise",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Plan {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "free" => Ok(Plan::Free),
            "starter" => Ok(Plan::Starter),
            "pro" => Ok(Plan::Pro),
            "enterprise" => Ok(Plan::Enterprise),
            other => Err(format!("unknown plan: {other}")),
        }
    }
}

/// Vendor CRM kind. `Mock` backs the seed test scenarios and is always
/// registered alongside the real vendor leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrmKind {
    Yclients,
    Altegio,
    Bitrix24,
    OneC,
    AmoCrm,
    Dikidi,
    EasyWeek,
    Mock,
}

impl fmt::Display for CrmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CrmKind::Yclients => "yclients",
            CrmKind::Altegio => "altegio",
            CrmKind::Bitrix24 => "bitrix24",
            CrmKind::OneC => "1c",
            CrmKind::AmoCrm => "amocrm",
            CrmKind::Dikidi => "dikidi",
            CrmKind::EasyWeek => "easyweek",
            CrmKind::Mock => "mock",
        };
        write!(f, "{s}")
    }
}

impl FromStr for CrmKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "yclients" => Ok(CrmKind::Yclients),
            "altegio" => Ok(CrmKind::Altegio),
            "bitrix24" => Ok(CrmKind::Bitrix24),
            "1c" => Ok(CrmKind::OneC),
            "amocrm" => Ok(CrmKind::AmoCrm),
            "dikidi" => Ok(CrmKind::Dikidi),
            "easyweek" => Ok(CrmKind::EasyWeek),
            "mock" => Ok(CrmKind::Mock),
            other => Err(format!("unknown CRM kind: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_is_channel_stable() {
        let id = SessionId::for_channel(ChannelKind::Telegram, "42");
        assert_eq!(id.as_str(), "tg_42");
    }

    #[test]
    fn session_state_roundtrips_through_display_and_fromstr() {
        for s in [
            SessionState::Initiated,
            SessionState::Greeting,
            SessionState::CollectingInfo,
            SessionState::Consulting,
            SessionState::Booking,
            SessionState::Confirming,
            SessionState::Completed,
            SessionState::Failed,
        ] {
            let parsed: SessionState = s.to_string().parse().unwrap();
            assert_eq!(parsed, s);
        }
    }

    #[test]
    fn plan_parse_rejects_unknown() {
        assert!("gold".parse::<Plan>().is_err());
    }
}

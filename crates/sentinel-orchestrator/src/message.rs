use sentinel_core::types::{ChannelKind, MessageKind, TenantId};
use serde_json::Value;

/// Neutral inbound message, already stripped of channel-specific payload
/// shape by the ingress layer. `tenant_id` absent is a hard failure — see
/// `OrchestratorError::MissingTenant`.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct InboundMessage {
    pub tenant_id: Option<TenantId>,
    pub channel_kind: ChannelKind,
    pub external_user_id: String,
    pub kind: MessageKind,
    pub text: Option<String>,
    pub media_url: Option<String>,
    pub from_user_name: Option<String>,
}

/// Result of one orchestrator pass over an inbound message. At most one
/// tool call is dispatched per request — see `engine::Orchestrator::handle_message`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OrchestratorReply {
    pub text: Option<String>,
    pub function_called: bool,
    pub needs_followup: bool,
    pub function_name: Option<String>,
    pub function_result: Option<Value>,
}

impl OrchestratorReply {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            function_called: false,
            needs_followup: false,
            function_name: None,
            function_result: None,
        }
    }

    pub fn tool_call(name: impl Into<String>, result: Value) -> Self {
        Self {
            text: None,
            function_called: true,
            needs_followup: true,
            function_name: Some(name.into()),
            function_result: Some(result),
        }
    }
}

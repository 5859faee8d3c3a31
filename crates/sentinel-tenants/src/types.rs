use chrono::{DateTime, Utc};
use sentinel_core::types::{ChannelId, ChannelKind, CrmKind, Plan, TenantId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub is_active: bool,
    pub plan: Plan,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub tenant_id: TenantId,
    pub kind: ChannelKind,
    pub webhook_token: String,
    pub is_active: bool,
    pub extra_config: serde_json::Value,
    pub message_count: i64,
    pub last_activity_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmBinding {
    pub tenant_id: TenantId,
    pub crm_kind: CrmKind,
    /// Always a vault envelope — never handled in plaintext outside the
    /// orchestrator's decrypt call.
    pub encrypted_credentials: String,
    pub base_url: Option<String>,
    pub remote_account_id: Option<String>,
    pub extra_settings: serde_json::Value,
    pub is_active: bool,
}

/// One catalogue entry (service or product) inside the agent policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogueItem {
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentPolicy {
    pub tenant_id: TenantId,
    pub business_description: Option<String>,
    pub working_hours: Option<String>,
    pub address: Option<String>,
    pub display_phone: Option<String>,
    pub service_catalogue: Vec<CatalogueItem>,
    pub product_catalogue: Vec<CatalogueItem>,
    pub greeting_message: Option<String>,
    pub farewell_message: Option<String>,
    pub custom_instructions: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub model_name: Option<String>,
    pub auto_booking: bool,
}

impl AgentPolicy {
    /// Deterministic empty default used when a tenant has not configured a
    /// policy yet.
    pub fn empty(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            business_description: None,
            working_hours: None,
            address: None,
            display_phone: None,
            service_catalogue: Vec::new(),
            product_catalogue: Vec::new(),
            greeting_message: None,
            farewell_message: None,
            custom_instructions: None,
            temperature: 0.7,
            max_tokens: 1024,
            model_name: None,
            auto_booking: false,
        }
    }

    /// Clamp LLM knobs to provider-valid ranges before use — never trust a
    /// stored policy's raw values directly.
    pub fn clamped_temperature(&self) -> f32 {
        self.temperature.clamp(0.0, 2.0)
    }

    pub fn clamped_max_tokens(&self) -> u32 {
        self.max_tokens.clamp(1, 32_000)
    }
}

/// Derived projection of policy + tenant name, handed to the LLM system
/// prompt builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptContext {
    pub tenant_name: String,
    pub business_description: Option<String>,
    pub working_hours: Option<String>,
    pub address: Option<String>,
    pub display_phone: Option<String>,
    pub service_catalogue: Vec<CatalogueItem>,
    pub product_catalogue: Vec<CatalogueItem>,
    pub greeting_message: Option<String>,
    pub farewell_message: Option<String>,
    pub custom_instructions: Option<String>,
}

impl PromptContext {
    pub fn from_policy(tenant_name: String, policy: &AgentPolicy) -> Self {
        Self {
            tenant_name,
            business_description: policy.business_description.clone(),
            working_hours: policy.working_hours.clone(),
            address: policy.address.clone(),
            display_phone: policy.display_phone.clone(),
            service_catalogue: policy.service_catalogue.clone(),
            product_catalogue: policy.product_catalogue.clone(),
            greeting_message: policy.greeting_message.clone(),
            farewell_message: policy.farewell_message.clone(),
            custom_instructions: policy.custom_instructions.clone(),
        }
    }
}

//! Resolves `tenant_id` from a webhook token and loads the tenant-scoped
//! CRM binding / agent policy / prompt context.
//!
//! An in-process map guarded by a mutex, with an insertion-order eviction
//! list, short-circuits the common-path DB round trip while still
//! respecting a ≤60s cache TTL and invalidating on explicit write.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::Utc;
use sentinel_core::types::{ChannelId, ChannelKind, CrmKind, TenantId};
use sqlx::PgPool;
use tracing::instrument;

use crate::error::TenantRegistryError;
use crate::types::{AgentPolicy, Channel, CrmBinding, PromptContext};

const CACHE_TTL: Duration = Duration::from_secs(60);
const CACHE_MAX: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    Found(Box<Channel>),
    NotFound,
    Inactive,
}

struct CacheEntry {
    channel: Channel,
    inserted_at: Instant,
}

pub struct TenantRegistry {
    pool: PgPool,
    by_token: Mutex<HashMap<String, CacheEntry>>,
    token_order: Mutex<Vec<String>>,
}

impl TenantRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            by_token: Mutex::new(HashMap::new()),
            token_order: Mutex::new(Vec::new()),
        }
    }

    /// Single lookup by unique webhook token. The token itself is opaque —
    /// no constant-time compare is needed on this data path, only on the
    /// ingress-level `X-API-Key`/HMAC checks in sentinel-gateway.
    #[instrument(skip(self, token))]
    pub async fn resolve_by_webhook_token(
        &self,
        token: &str,
    ) -> Result<ResolveOutcome, TenantRegistryError> {
        if let Some(channel) = self.cache_lookup(token) {
            return Ok(if channel.is_active {
                ResolveOutcome::Found(Box::new(channel))
            } else {
                ResolveOutcome::Inactive
            });
        }

        let row = sqlx::query_as::<_, ChannelRow>(
            r#"SELECT id, tenant_id, kind, webhook_token, is_active, extra_config,
                      message_count, last_activity_at
               FROM channels WHERE webhook_token = $1"#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(ResolveOutcome::NotFound);
        };

        let channel = row.into_channel();
        self.cache_insert(token.to_string(), channel.clone());

        Ok(if channel.is_active {
            ResolveOutcome::Found(Box::new(channel))
        } else {
            ResolveOutcome::Inactive
        })
    }

    #[instrument(skip(self))]
    pub async fn load_crm_binding(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Option<CrmBinding>, TenantRegistryError> {
        let row = sqlx::query_as::<_, CrmBindingRow>(
            r#"SELECT tenant_id, crm_kind, encrypted_credentials, base_url,
                      remote_account_id, extra_settings, is_active
               FROM crm_bindings WHERE tenant_id = $1 AND is_active = true"#,
        )
        .bind(tenant_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_binding()))
    }

    /// Missing policy yields a deterministic empty default rather than an
    /// error — the orchestrator must always have *something* to prompt with.
    #[instrument(skip(self))]
    pub async fn load_agent_policy(
        &self,
        tenant_id: &TenantId,
    ) -> Result<AgentPolicy, TenantRegistryError> {
        let row = sqlx::query_as::<_, AgentPolicyRow>(
            r#"SELECT tenant_id, business_description, working_hours, address,
                      display_phone, service_catalogue, product_catalogue,
                      greeting_message, farewell_message, custom_instructions,
                      temperature, max_tokens, model_name, auto_booking
               FROM agent_policies WHERE tenant_id = $1"#,
        )
        .bind(tenant_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row
            .map(|r| r.into_policy())
            .unwrap_or_else(|| AgentPolicy::empty(tenant_id.clone())))
    }

    #[instrument(skip(self))]
    pub async fn load_company_prompt_context(
        &self,
        tenant_id: &TenantId,
    ) -> Result<PromptContext, TenantRegistryError> {
        let tenant_name = sqlx::query_scalar::<_, String>("SELECT name FROM tenants WHERE id = $1")
            .bind(tenant_id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .unwrap_or_else(|| tenant_id.as_str().to_string());

        let policy = self.load_agent_policy(tenant_id).await?;
        Ok(PromptContext::from_policy(tenant_name, &policy))
    }

    /// Invalidate a cached channel entry after an explicit write (token
    /// rotation, deactivation). No lookup is allowed to hold a long-lived
    /// lock across a request, so this just drops the map entry.
    pub fn invalidate_token(&self, token: &str) {
        self.cache_remove(token);
    }

    fn cache_lookup(&self, token: &str) -> Option<Channel> {
        let mut map = self.by_token.lock().unwrap();
        match map.get(token) {
            Some(entry) if entry.inserted_at.elapsed() < CACHE_TTL => Some(entry.channel.clone()),
            Some(_) => {
                map.remove(token);
                None
            }
            None => None,
        }
    }

    fn cache_remove(&self, token: &str) {
        self.by_token.lock().unwrap().remove(token);
    }

    fn cache_insert(&self, token: String, channel: Channel) {
        let mut map = self.by_token.lock().unwrap();
        let mut order = self.token_order.lock().unwrap();

        if map.len() >= CACHE_MAX {
            let evict_count = CACHE_MAX / 2;
            for key in order.drain(..evict_count.min(order.len())) {
                map.remove(&key);
            }
        }

        order.push(token.clone());
        map.insert(
            token,
            CacheEntry {
                channel,
                inserted_at: Instant::now(),
            },
        );
    }
}

#[derive(sqlx::FromRow)]
struct ChannelRow {
    id: String,
    tenant_id: String,
    kind: String,
    webhook_token: String,
    is_active: bool,
    extra_config: serde_json::Value,
    message_count: i64,
    last_activity_at: Option<chrono::DateTime<Utc>>,
}

impl ChannelRow {
    fn into_channel(self) -> Channel {
        Channel {
            id: ChannelId::from(self.id.as_str()),
            tenant_id: TenantId::from(self.tenant_id),
            kind: self.kind.parse::<ChannelKind>().unwrap_or(ChannelKind::Web),
            webhook_token: self.webhook_token,
            is_active: self.is_active,
            extra_config: self.extra_config,
            message_count: self.message_count,
            last_activity_at: self.last_activity_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CrmBindingRow {
    tenant_id: String,
    crm_kind: String,
    encrypted_credentials: String,
    base_url: Option<String>,
    remote_account_id: Option<String>,
    extra_settings: serde_json::Value,
    is_active: bool,
}

impl CrmBindingRow {
    fn into_binding(self) -> CrmBinding {
        CrmBinding {
            tenant_id: TenantId::from(self.tenant_id),
            crm_kind: self.crm_kind.parse::<CrmKind>().unwrap_or(CrmKind::Mock),
            encrypted_credentials: self.encrypted_credentials,
            base_url: self.base_url,
            remote_account_id: self.remote_account_id,
            extra_settings: self.extra_settings,
            is_active: self.is_active,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AgentPolicyRow {
    tenant_id: String,
    business_description: Option<String>,
    working_hours: Option<String>,
    address: Option<String>,
    display_phone: Option<String>,
    service_catalogue: serde_json::Value,
    product_catalogue: serde_json::Value,
    greeting_message: Option<String>,
    farewell_message: Option<String>,
    custom_instructions: Option<String>,
    temperature: f32,
    max_tokens: i32,
    model_name: Option<String>,
    auto_booking: bool,
}

impl AgentPolicyRow {
    fn into_policy(self) -> AgentPolicy {
        AgentPolicy {
            tenant_id: TenantId::from(self.tenant_id),
            business_description: self.business_description,
            working_hours: self.working_hours,
            address: self.address,
            display_phone: self.display_phone,
            service_catalogue: serde_json::from_value(self.service_catalogue).unwrap_or_default(),
            product_catalogue: serde_json::from_value(self.product_catalogue).unwrap_or_default(),
            greeting_message: self.greeting_message,
            farewell_message: self.farewell_message,
            custom_instructions: self.custom_instructions,
            temperature: self.temperature,
            max_tokens: self.max_tokens.max(0) as u32,
            model_name: self.model_name,
            auto_booking: self.auto_booking,
        }
    }
}

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const N_HIST: usize = 20;
pub const MASTER_KEY_PBKDF2_ITERATIONS: u32 = 600_000;
pub const WEBHOOK_REPLAY_MAX_AGE_SECS: i64 = 300;

/// Top-level config (sentinel.toml + SENTINEL_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub security: SecurityConfig,
    pub database: DatabaseConfig,
    pub hot_store: HotStoreConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    /// Load config from a TOML file with SENTINEL_* env var overrides.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("SENTINEL_").split("_"))
            .extract()
            .map_err(|e| crate::error::SentinelError::Config(e.to_string()))
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{home}/.sentinel/sentinel.toml")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
        }
    }
}

/// Secrets used by the vault (master key) and the ingress gateway (API key
/// + webhook HMAC secret). Never `Debug`-print the field values directly.
#[derive(Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub master_key: String,
    pub api_key_secret: String,
    pub webhook_secret: String,
    /// Off by default — many deployments front webhooks with a provider
    /// that doesn't sign callbacks. When on, every webhook request must
    /// carry a valid `X-Webhook-Signature`/`X-Webhook-Timestamp` pair.
    #[serde(default)]
    pub webhook_signature_required: bool,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("master_key", &"<redacted>")
            .field("api_key_secret", &"<redacted>")
            .field("webhook_secret", &"<redacted>")
            .field("webhook_signature_required", &self.webhook_signature_required)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotStoreConfig {
    pub url: String,
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_key: String,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

/// Per-plan retention policy, overridable per deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    #[serde(default = "default_free_days")]
    pub free_days: i64,
    #[serde(default = "default_starter_days")]
    pub starter_days: i64,
    #[serde(default = "default_pro_days")]
    pub pro_days: i64,
    #[serde(default = "default_enterprise_days")]
    pub enterprise_days: i64,
    #[serde(default = "default_min_retention_days")]
    pub min_retention_days: i64,
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            free_days: default_free_days(),
            starter_days: default_starter_days(),
            pro_days: default_pro_days(),
            enterprise_days: default_enterprise_days(),
            min_retention_days: default_min_retention_days(),
            batch_size: default_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    #[serde(default = "default_health_limit")]
    pub health_per_min: u32,
    #[serde(default = "default_webhook_limit")]
    pub webhook_per_min: u32,
    #[serde(default = "default_authenticated_limit")]
    pub authenticated_per_min: u32,
    #[serde(default = "default_default_limit")]
    pub default_per_min: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            health_per_min: default_health_limit(),
            webhook_per_min: default_webhook_limit(),
            authenticated_per_min: default_authenticated_limit(),
            default_per_min: default_default_limit(),
        }
    }
}

fn bool_true() -> bool {
    true
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_max_connections() -> u32 {
    10
}
fn default_connect_timeout_secs() -> u64 {
    5
}
fn default_command_timeout_ms() -> u64 {
    1_000
}
fn default_llm_base_url() -> String {
    "https://api.openai.com".to_string()
}
fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_free_days() -> i64 {
    30
}
fn default_starter_days() -> i64 {
    90
}
fn default_pro_days() -> i64 {
    365
}
fn default_enterprise_days() -> i64 {
    730
}
fn default_min_retention_days() -> i64 {
    30
}
fn default_batch_size() -> i64 {
    1000
}
fn default_health_limit() -> u32 {
    10_000
}
fn default_webhook_limit() -> u32 {
    200
}
fn default_authenticated_limit() -> u32 {
    1_000
}
fn default_default_limit() -> u32 {
    100
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentinelError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tenant missing on inbound message")]
    MissingTenant,

    #[error("CRM binding not configured for tenant {tenant}")]
    CrmNotConfigured { tenant: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request timeout after {ms}ms")]
    Timeout { ms: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SentinelError {
    /// Stable error code returned to API clients — never the display text,
    /// which may carry detail unsafe to expose.
    pub fn code(&self) -> &'static str {
        match self {
            SentinelError::Config(_) => "CONFIG_ERROR",
            SentinelError::MissingTenant => "CONFIG_ERROR",
            SentinelError::CrmNotConfigured { .. } => "CONFIG_ERROR",
            SentinelError::Transport(_) => "TRANSPORT_ERROR",
            SentinelError::Protocol(_) => "PROTOCOL_ERROR",
            SentinelError::AuthFailed(_) => "AUTH_ERROR",
            SentinelError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            SentinelError::Validation(_) => "VALIDATION_ERROR",
            SentinelError::Serialization(_) => "PROTOCOL_ERROR",
            SentinelError::Io(_) => "TRANSPORT_ERROR",
            SentinelError::Timeout { .. } => "TRANSPORT_ERROR",
            SentinelError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, SentinelError>;

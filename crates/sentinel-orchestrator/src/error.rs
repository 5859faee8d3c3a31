use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("tenant missing on inbound message")]
    MissingTenant,

    #[error("CRM binding not configured for tenant {tenant}")]
    CrmNotConfigured { tenant: String },

    #[error(transparent)]
    Tenant(#[from] sentinel_tenants::TenantRegistryError),

    #[error(transparent)]
    Vault(#[from] sentinel_vault::VaultError),

    #[error(transparent)]
    Session(#[from] sentinel_sessions::SessionStoreError),

    #[error(transparent)]
    History(#[from] sentinel_history::HistoryStoreError),

    #[error(transparent)]
    Llm(#[from] sentinel_llm::LlmError),

    #[error("LLM returned neither text nor a tool call")]
    EmptyResponse,

    #[error("operation timed out after {ms}ms")]
    Timeout { ms: u64 },
}

impl OrchestratorError {
    /// Stable taxonomy code — never the display text, which may carry
    /// detail unsafe to expose to the end user.
    pub fn code(&self) -> &'static str {
        match self {
            OrchestratorError::MissingTenant => "CONFIG_ERROR",
            OrchestratorError::CrmNotConfigured { .. } => "CONFIG_ERROR",
            OrchestratorError::Tenant(_) => "TRANSPORT_ERROR",
            OrchestratorError::Vault(_) => "AUTH_ERROR",
            OrchestratorError::Session(_) => "TRANSPORT_ERROR",
            OrchestratorError::History(_) => "TRANSPORT_ERROR",
            OrchestratorError::Llm(_) => "PROTOCOL_ERROR",
            OrchestratorError::EmptyResponse => "PROTOCOL_ERROR",
            OrchestratorError::Timeout { .. } => "TRANSPORT_ERROR",
        }
    }

    /// Generic, user-safe fallback text for this error class. Never includes
    /// the underlying detail — that only goes to structured logs.
    pub fn fallback_text(&self) -> &'static str {
        match self {
            OrchestratorError::EmptyResponse | OrchestratorError::Llm(_) => {
                "Could you rephrase that?"
            }
            _ => "Sorry, something went wrong on our end. Please try again in a moment.",
        }
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;

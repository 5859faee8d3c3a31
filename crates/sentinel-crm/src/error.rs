use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrmError {
    #[error("CRM transport error: {0}")]
    Transport(String),

    #[error("CRM authentication failed: {0}")]
    AuthFailed(String),

    #[error("CRM resource not found")]
    NotFound,

    #[error("CRM rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("invalid CRM request: {0}")]
    Invalid(String),
}

impl From<reqwest::Error> for CrmError {
    fn from(e: reqwest::Error) -> Self {
        CrmError::Transport(e.to_string())
    }
}

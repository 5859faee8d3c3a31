#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("malformed provider response: {0}")]
    Parse(String),

    #[error("provider returned neither text nor a tool call")]
    EmptyResponse,
}

pub type Result<T> = std::result::Result<T, LlmError>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("hot store error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("stored session payload was not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SessionStoreError>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetentionError {
    #[error("database error: {0}")]
    Database(#[from] sentinel_history::HistoryStoreError),
}

pub type Result<T> = std::result::Result<T, RetentionError>;

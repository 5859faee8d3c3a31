use std::future::Future;
use std::time::Duration;

use crate::error::OrchestratorError;

pub const LLM_DEADLINE: Duration = Duration::from_secs(30);
pub const CRM_DEADLINE: Duration = Duration::from_secs(30);
pub const DB_DEADLINE: Duration = Duration::from_secs(5);
pub const REDIS_DEADLINE: Duration = Duration::from_secs(1);

/// Wraps a suspending call in an explicit deadline. A deadline hit is never
/// silently swallowed — it surfaces as `OrchestratorError::Timeout`.
pub async fn deadline<T, E>(
    duration: Duration,
    fut: impl Future<Output = std::result::Result<T, E>>,
) -> std::result::Result<T, OrchestratorError>
where
    E: Into<OrchestratorError>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(inner) => inner.map_err(Into::into),
        Err(_) => Err(OrchestratorError::Timeout { ms: duration.as_millis() as u64 }),
    }
}

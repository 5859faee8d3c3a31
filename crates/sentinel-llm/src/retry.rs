use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::error::LlmError;

const BACKOFF_BASE_MS: u64 = 250;
const BACKOFF_MAX_MS: u64 = 4000;
const JITTER_FRACTION: f64 = 0.1;
const MAX_ATTEMPTS: u32 = 3;

/// Retries `op` up to [`MAX_ATTEMPTS`] times with exponential backoff and
/// jitter, but only for transient transport failures. API/content errors
/// (including rate limiting, which carries its own retry-after contract)
/// are returned immediately.
pub async fn with_transport_retry<F, Fut, T>(provider: &str, mut op: F) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, LlmError>>,
{
    let mut delay_ms = BACKOFF_BASE_MS;

    for attempt in 1..=MAX_ATTEMPTS {
        match op().await {
            Ok(v) => return Ok(v),
            Err(LlmError::Transport(e)) if attempt < MAX_ATTEMPTS => {
                let jitter = jitter_ms(delay_ms);
                warn!(provider, attempt, error = %e, retry_after_ms = delay_ms + jitter, "transient LLM transport error, retrying");
                sleep(Duration::from_millis(delay_ms + jitter)).await;
                delay_ms = (delay_ms * 2).min(BACKOFF_MAX_MS);
            }
            Err(e) => return Err(e),
        }
    }

    unreachable!("retry loop exits via one of the match arms above")
}

fn jitter_ms(base_ms: u64) -> u64 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    let max_jitter = ((base_ms as f64) * JITTER_FRACTION) as u64;
    if max_jitter == 0 {
        0
    } else {
        (nanos as u64) % max_jitter
    }
}

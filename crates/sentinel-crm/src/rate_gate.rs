use std::sync::Mutex;
use std::time::{Duration, Instant};

use tokio::time::sleep;

/// Per-adapter leaky-bucket gate: at most one outbound call every
/// `min_interval`. Generalizes the reconnect backoff/jitter helper
/// channel adapters use for their connect loop into a steady-state
/// outbound throttle, since vendor CRM APIs enforce calls-per-second caps
/// rather than connection-attempt caps.
pub struct RateGate {
    min_interval: Duration,
    jitter_fraction: f64,
    last_call: Mutex<Option<Instant>>,
}

impl RateGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            jitter_fraction: 0.10,
            last_call: Mutex::new(None),
        }
    }

    /// Block until the gate allows the next call, then record it.
    pub async fn acquire(&self) {
        let wait = {
            let mut last = self.last_call.lock().unwrap();
            let now = Instant::now();
            let wait = match *last {
                Some(prev) => {
                    let elapsed = now.duration_since(prev);
                    self.min_interval.checked_sub(elapsed)
                }
                None => None,
            };
            *last = Some(now + wait.unwrap_or_default());
            wait
        };

        if let Some(base) = wait {
            let jitter_ms = ((base.as_millis() as f64) * self.jitter_fraction) as u64;
            let nanos = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.subsec_nanos())
                .unwrap_or(0);
            let jitter = if jitter_ms == 0 { 0 } else { (nanos as u64) % jitter_ms };
            sleep(base + Duration::from_millis(jitter)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_call_never_waits() {
        let gate = RateGate::new(Duration::from_millis(50));
        let start = Instant::now();
        gate.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}

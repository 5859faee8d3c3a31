//! Sliding-window rate limiting over a Redis sorted set.
//!
//! One ZSET per identifier, scored by request timestamp in milliseconds.
//! Each check trims entries older than the window, counts what's left, adds
//! the current request, and refreshes the key's TTL. All four commands run
//! as a single MULTI/EXEC transaction, so concurrent requests for the same
//! identifier can't race between the trim and the add — the count a request
//! sees always reflects every entry committed before it, including ones
//! added by requests racing it at the network level.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use redis::aio::ConnectionManager;
use redis::AsyncCommands;

#[derive(Debug, Clone, Copy)]
pub struct RateLimitOutcome {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_secs: u64,
}

/// Which request class an inbound call belongs to, for limit selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitClass {
    Health,
    Webhook,
    Authenticated,
    Default,
}

#[derive(Clone)]
pub struct RateLimiter {
    conn: ConnectionManager,
    window: Duration,
}

impl RateLimiter {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn, window: Duration::from_secs(60) }
    }

    /// Liveness probe for the health endpoint — does not fail open, since
    /// the caller needs to know the real backend state.
    pub async fn ping(&self) -> bool {
        let mut conn = self.conn.clone();
        redis::cmd("PING").query_async::<String>(&mut conn).await.is_ok()
    }

    /// Checks and records one request for `identifier` against `limit`
    /// requests per window. On any Redis error the call fails open — a
    /// rate limiter that's down must never become an outage.
    pub async fn check(&self, identifier: &str, limit: u32) -> RateLimitOutcome {
        match self.try_check(identifier, limit).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, identifier, "rate limiter backend unavailable, failing open");
                RateLimitOutcome { allowed: true, limit, remaining: limit, reset_secs: self.window.as_secs() }
            }
        }
    }

    /// Trims, counts, adds and refreshes the TTL in a single MULTI/EXEC
    /// transaction, so a concurrent request on the same identifier can never
    /// observe the count between the trim and this request's own add.
    async fn try_check(&self, identifier: &str, limit: u32) -> redis::RedisResult<RateLimitOutcome> {
        let mut conn = self.conn.clone();
        let key = format!("sentinel:ratelimit:{identifier}");
        let now_ms = now_millis();
        let window_start = now_ms.saturating_sub(self.window.as_millis() as u64);
        let member = format!("{now_ms}-{}", uuid::Uuid::new_v4());

        let mut pipe = redis::pipe();
        pipe.atomic()
            .zrembyscore(&key, 0i64, window_start as i64)
            .ignore()
            .zcard(&key)
            .zadd(&key, &member, now_ms as i64)
            .ignore()
            .expire(&key, self.window.as_secs() as i64)
            .ignore();

        let (count,): (u32,) = pipe.query_async(&mut conn).await?;

        if count >= limit {
            Ok(RateLimitOutcome {
                allowed: false,
                limit,
                remaining: 0,
                reset_secs: self.window.as_secs(),
            })
        } else {
            Ok(RateLimitOutcome {
                allowed: true,
                limit,
                remaining: limit.saturating_sub(count + 1),
                reset_secs: self.window.as_secs(),
            })
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}

/// Resolve the rate-limit identifier for a request: API key prefix takes
/// priority, then a forwarded-for IP, then the direct peer IP.
pub fn identifier_for(api_key: Option<&str>, forwarded_for: Option<&str>, peer_ip: &str) -> String {
    if let Some(key) = api_key {
        let prefix: String = key.chars().take(12).collect();
        return format!("key:{prefix}");
    }
    if let Some(fwd) = forwarded_for {
        let first = fwd.split(',').next().unwrap_or(fwd).trim();
        if !first.is_empty() {
            return format!("ip:{first}");
        }
    }
    format!("ip:{peer_ip}")
}

pub fn limit_for(class: LimitClass, cfg: &sentinel_core::config::RateLimitConfig) -> u32 {
    match class {
        LimitClass::Health => cfg.health_per_min,
        LimitClass::Webhook => cfg.webhook_per_min,
        LimitClass::Authenticated => cfg.authenticated_per_min,
        LimitClass::Default => cfg.default_per_min,
    }
}

pub type SharedRateLimiter = Arc<RateLimiter>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_prefers_api_key_over_ip() {
        let id = identifier_for(Some("sk-live-abcdef123456"), Some("1.2.3.4"), "5.6.7.8");
        assert!(id.starts_with("key:"));
    }

    #[test]
    fn identifier_falls_back_to_forwarded_ip_then_peer() {
        assert_eq!(identifier_for(None, Some("9.9.9.9, 1.1.1.1"), "2.2.2.2"), "ip:9.9.9.9");
        assert_eq!(identifier_for(None, None, "2.2.2.2"), "ip:2.2.2.2");
    }
}

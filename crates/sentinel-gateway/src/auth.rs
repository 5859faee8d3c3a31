//! Webhook signature verification and API-key authentication.
//!
//! Every inbound channel uses the same header pair rather than a
//! per-vendor scheme: `X-Webhook-Signature` (hex HMAC-SHA256 over the raw
//! body, keyed by the tenant's webhook secret) and `X-Webhook-Timestamp`
//! (RFC 3339, rejected if more than `WEBHOOK_REPLAY_MAX_AGE_SECS` old).

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use sentinel_core::config::WEBHOOK_REPLAY_MAX_AGE_SECS;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("missing X-Webhook-Signature header")]
    MissingSignature,
    #[error("missing X-Webhook-Timestamp header")]
    MissingTimestamp,
    #[error("X-Webhook-Timestamp is not valid RFC 3339")]
    MalformedTimestamp,
    #[error("X-Webhook-Timestamp is outside the replay window")]
    StaleTimestamp,
    #[error("X-Webhook-Signature is not valid hex")]
    MalformedSignature,
    #[error("signature does not match")]
    Mismatch,
}

/// Verify a webhook request's signature and timestamp against `secret`.
pub fn verify_webhook_signature(
    headers: &HeaderMap,
    body: &[u8],
    secret: &str,
) -> Result<(), SignatureError> {
    let sig_header = headers
        .get("x-webhook-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(SignatureError::MissingSignature)?;

    let ts_header = headers
        .get("x-webhook-timestamp")
        .and_then(|v| v.to_str().ok())
        .ok_or(SignatureError::MissingTimestamp)?;

    let ts: DateTime<Utc> = ts_header
        .parse()
        .map_err(|_| SignatureError::MalformedTimestamp)?;
    let age_secs = (Utc::now() - ts).num_seconds().abs();
    if age_secs > WEBHOOK_REPLAY_MAX_AGE_SECS {
        return Err(SignatureError::StaleTimestamp);
    }

    let expected_bytes = hex::decode(sig_header).map_err(|_| SignatureError::MalformedSignature)?;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts a key of any length");
    mac.update(ts_header.as_bytes());
    mac.update(body);

    mac.verify_slice(&expected_bytes).map_err(|_| SignatureError::Mismatch)
}

/// Constant-time comparison of a presented API key against the configured
/// secret, via `ring::constant_time` so timing leaks nothing about length
/// or prefix match.
pub fn verify_api_key(presented: &str, expected: &str) -> bool {
    ring::constant_time::verify_slices_are_equal(presented.as_bytes(), expected.as_bytes()).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn signed_headers(secret: &str, body: &[u8]) -> HeaderMap {
        let ts = Utc::now().to_rfc3339();
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(ts.as_bytes());
        mac.update(body);
        let sig = hex::encode(mac.finalize().into_bytes());

        let mut headers = HeaderMap::new();
        headers.insert("x-webhook-signature", HeaderValue::from_str(&sig).unwrap());
        headers.insert("x-webhook-timestamp", HeaderValue::from_str(&ts).unwrap());
        headers
    }

    #[test]
    fn valid_signature_and_fresh_timestamp_pass() {
        let body = b"{\"hello\":\"world\"}";
        let headers = signed_headers("shh", body);
        assert!(verify_webhook_signature(&headers, body, "shh").is_ok());
    }

    #[test]
    fn wrong_secret_fails() {
        let body = b"payload";
        let headers = signed_headers("shh", body);
        assert!(matches!(
            verify_webhook_signature(&headers, body, "different"),
            Err(SignatureError::Mismatch)
        ));
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let body = b"payload";
        let mut mac = HmacSha256::new_from_slice(b"shh").unwrap();
        let old_ts = (Utc::now() - chrono::Duration::seconds(WEBHOOK_REPLAY_MAX_AGE_SECS + 60))
            .to_rfc3339();
        mac.update(old_ts.as_bytes());
        mac.update(body);
        let sig = hex::encode(mac.finalize().into_bytes());

        let mut headers = HeaderMap::new();
        headers.insert("x-webhook-signature", HeaderValue::from_str(&sig).unwrap());
        headers.insert("x-webhook-timestamp", HeaderValue::from_str(&old_ts).unwrap());

        assert!(matches!(
            verify_webhook_signature(&headers, body, "shh"),
            Err(SignatureError::StaleTimestamp)
        ));
    }

    #[test]
    fn api_key_match_and_mismatch() {
        assert!(verify_api_key("secret-key", "secret-key"));
        assert!(!verify_api_key("secret-key", "other-key"));
    }
}

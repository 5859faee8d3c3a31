//! Authenticated symmetric encryption for tenant CRM credentials at rest.
//!
//! A single process-wide master key is derived once, at construction, from a
//! configured secret via PBKDF2-HMAC-SHA256 over a deployment-fixed salt.
//! Ciphertexts are AES-256-GCM envelopes prefixed with a recognizable tag so
//! callers can cheaply tell whether a stored value is already encrypted.

use std::num::NonZeroU32;

use base64::Engine;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use thiserror::Error;

/// Fixed across all deployments — the master key secret is what provides
/// entropy, not the salt. Changing this invalidates every stored ciphertext.
const KDF_SALT: &[u8] = b"sentinel-secret-vault-salt-v1";

/// Recognizable envelope prefix — `is_envelope` is a cheap string check, not
/// a decrypt attempt.
const ENVELOPE_PREFIX: &str = "SV1:";

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("decryption failed: authentication tag mismatch or malformed envelope")]
    AuthFailure,
    #[error("value is not a recognized envelope")]
    NotAnEnvelope,
}



pub struct SecretVault {
    key: LessSafeKey,
    rng: SystemRandom,
}

impl SecretVault {
    /// Derive the master key from `secret` via PBKDF2-HMAC-SHA256.
    /// `iterations` MUST be at least 2^18 (262_144); see
    /// `sentinel_core::config::MASTER_KEY_PBKDF2_ITERATIONS` for the default.
    pub fn new(secret: &str, iterations: u32) -> Self {
        let iterations = NonZeroU32::new(iterations.max(1 << 18)).expect("iterations > 0");
        let mut key_bytes = [0u8; 32];
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            iterations,
            KDF_SALT,
            secret.as_bytes(),
            &mut key_bytes,
        );
        let unbound = UnboundKey::new(&AES_256_GCM, &key_bytes).expect("32-byte key is valid for AES-256-GCM");
        Self {
            key: LessSafeKey::new(unbound),
            rng: SystemRandom::new(),
        }
    }

    /// Cheap prefix check — does not attempt decryption.
    pub fn is_envelope(&self, value: &str) -> bool {
        value.starts_with(ENVELOPE_PREFIX)
    }

    /// Encrypt `plaintext`, returning a self-describing envelope string.
    /// Each call uses a fresh random nonce, so two encryptions of the same
    /// plaintext produce distinct ciphertexts.
    pub fn encrypt(&self, plaintext: &str) -> String {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .expect("system RNG must not fail");
        let nonce = Nonce::assume_unique_for_key(nonce_bytes);

        let mut in_out = plaintext.as_bytes().to_vec();
        self.key
            .seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
            .expect("encryption with a freshly generated nonce cannot fail");

        let mut payload = Vec::with_capacity(NONCE_LEN + in_out.len());
        payload.extend_from_slice(&nonce_bytes);
        payload.extend_from_slice(&in_out);

        format!(
            "{ENVELOPE_PREFIX}{}",
            base64::engine::general_purpose::STANDARD.encode(payload)
        )
    }

    /// Decrypt a value produced by `encrypt`. Fails loudly (never returns
    /// partial/garbage plaintext) on tag mismatch or malformed envelope.
    pub fn decrypt(&self, envelope: &str) -> Result<String, VaultError> {
        let body = envelope
            .strip_prefix(ENVELOPE_PREFIX)
            .ok_or(VaultError::NotAnEnvelope)?;
        let raw = base64::engine::general_purpose::STANDARD
            .decode(body)
            .map_err(|_| VaultError::AuthFailure)?;
        if raw.len() < NONCE_LEN {
            return Err(VaultError::AuthFailure);
        }
        let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes).map_err(|_| VaultError::AuthFailure)?;

        let mut in_out = ciphertext.to_vec();
        let plaintext = self
            .key
            .open_in_place(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| VaultError::AuthFailure)?;

        String::from_utf8(plaintext.to_vec()).map_err(|_| VaultError::AuthFailure)
    }

    /// Encrypt `value` only if it is not already an envelope. Idempotent on
    /// values that have already gone through the vault.
    pub fn encrypt_if_needed(&self, value: &str) -> String {
        if self.is_envelope(value) {
            value.to_string()
        } else {
            self.encrypt(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault() -> SecretVault {
        SecretVault::new("test-master-secret", 1 << 18)
    }

    #[test]
    fn roundtrip_preserves_plaintext() {
        let v = vault();
        let ct = v.encrypt("sk-vendor-api-key-123");
        assert_eq!(v.decrypt(&ct).unwrap(), "sk-vendor-api-key-123");
    }

    #[test]
    fn two_encryptions_of_same_plaintext_differ() {
        let v = vault();
        let a = v.encrypt("same-secret");
        let b = v.encrypt("same-secret");
        assert_ne!(a, b);
    }

    #[test]
    fn is_envelope_detects_own_prefix() {
        let v = vault();
        let ct = v.encrypt("x");
        assert!(v.is_envelope(&ct));
        assert!(!v.is_envelope("plain-text-value"));
    }

    #[test]
    fn tampered_ciphertext_fails_closed() {
        let v = vault();
        let mut ct = v.encrypt("sensitive").into_bytes();
        let last = ct.len() - 1;
        ct[last] ^= 0xFF;
        let ct = String::from_utf8(ct).unwrap();
        assert!(matches!(v.decrypt(&ct), Err(VaultError::AuthFailure)));
    }

    #[test]
    fn encrypt_if_needed_is_idempotent_on_envelopes() {
        let v = vault();
        let ct = v.encrypt("already-secret");
        assert_eq!(v.encrypt_if_needed(&ct), ct);
    }

    #[test]
    fn decrypting_non_envelope_fails() {
        let v = vault();
        assert!(matches!(v.decrypt("not-an-envelope"), Err(VaultError::AuthFailure) | Err(VaultError::NotAnEnvelope)));
    }
}

//! Client credential generation and token fingerprinting.
//!
//! Client secrets are bcrypt-hashed; access tokens are never stored
//! raw — only their SHA-256 fingerprint, which doubles as the primary
//! key for introspection and revocation lookups.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};

const BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

pub fn generate_client_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn generate_client_secret() -> String {
    let mut bytes = [0u8; 48];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn hash_client_secret(secret: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(secret, BCRYPT_COST)
}

pub fn verify_client_secret(secret: &str, hash: &str) -> bool {
    bcrypt::verify(secret, hash).unwrap_or(false)
}

/// Lowercase SHA-256 hex of the exact serialized JWT. Any serialization
/// drift between issuance and this hash breaks revocation, so callers
/// must fingerprint the literal string handed to (or received from) the
/// client — never a re-encoded equivalent.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_id_is_32_hex_chars() {
        let id = generate_client_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn client_secret_round_trips_through_bcrypt() {
        let secret = generate_client_secret();
        let hash = hash_client_secret(&secret).unwrap();
        assert!(verify_client_secret(&secret, &hash));
        assert!(!verify_client_secret("wrong-secret", &hash));
    }

    #[test]
    fn token_hash_is_deterministic() {
        let token = "header.payload.signature";
        assert_eq!(hash_token(token), hash_token(token));
        assert_ne!(hash_token(token), hash_token("different"));
    }
}

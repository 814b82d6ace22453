use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

use argon2::password_hash::{SaltString, rand_core::OsRng as PHOsRng};

/// Hash a new password using Argon2id with a random salt.
/// The returned PHC string goes into cabs_user.password_hash.
pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut PHOsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(|e| format!("argon2 hash error: {e}"))
}

/// Verify a candidate password against the stored PHC string.
/// A malformed stored hash verifies false rather than erroring.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(p) => p,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Generate an opaque session token to return to the client.
/// Only hash(token) is persisted.
pub fn generate_access_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hash token for DB storage (SHA-256 hex).
pub fn hash_access_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same input").unwrap();
        let b = hash_password("same input").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("same input", &a));
        assert!(verify_password("same input", &b));
    }

    #[test]
    fn malformed_stored_hash_verifies_false() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn token_hash_is_deterministic_hex() {
        let token = generate_access_token();
        let h1 = hash_access_token(&token);
        let h2 = hash_access_token(&token);
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert!(h1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generated_tokens_differ() {
        assert_ne!(generate_access_token(), generate_access_token());
    }
}

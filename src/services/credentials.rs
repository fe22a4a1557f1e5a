//! Password hashing and opaque token generation
//!
//! Stored password format: `pbkdf2_sha256$<iterations>$<salt b64>$<hash b64>`.
//! Session and reset tokens are random; only their HMAC-SHA256 digests,
//! keyed with `security.secret_key`, are persisted.

use crate::domain::{Result, ShasthoError};
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use rand::distributions::Alphanumeric;
use rand::{Rng, RngCore};
use sha2::Sha256;

pub const PBKDF2_ITERATIONS: u32 = 100_000;
pub const SALT_LENGTH: usize = 16;
pub const HASH_LENGTH: usize = 32;
pub const RESET_TOKEN_LENGTH: usize = 64;

const SCHEME: &str = "pbkdf2_sha256";

/// Hashes `password` with a fresh random salt
pub fn hash_password(password: &str, iterations: u32) -> String {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    let hash = derive(password, &salt, iterations);
    format!(
        "{SCHEME}${iterations}${}${}",
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(hash)
    )
}

/// Checks `password` against a stored hash
///
/// # Errors
///
/// Returns an error if the stored value is not in the expected format.
pub fn verify_password(password: &str, stored: &str) -> Result<bool> {
    let malformed = || ShasthoError::Other("Stored password hash is malformed".to_string());

    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(hash), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(malformed());
    };
    if scheme != SCHEME {
        return Err(malformed());
    }
    let iterations: u32 = iterations.parse().map_err(|_| malformed())?;
    let salt = STANDARD_NO_PAD.decode(salt).map_err(|_| malformed())?;
    let expected = STANDARD_NO_PAD.decode(hash).map_err(|_| malformed())?;

    let actual = derive(password, &salt, iterations);
    Ok(constant_time_eq(&actual, &expected))
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LENGTH] {
    let mut out = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    out
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Random 256-bit bearer token, URL-safe base64
pub fn session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Random alphanumeric password reset token
pub fn reset_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Lowercase hex HMAC-SHA256 of a token under the server key, as persisted
pub fn token_digest(key: &[u8], token: &str) -> Result<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key)
        .map_err(|e| ShasthoError::Configuration(format!("Invalid token key: {e}")))?;
    mac.update(token.as_bytes());
    Ok(mac
        .finalize()
        .into_bytes()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Keeps the unit tests fast; the format carries the count
    const TEST_ITERATIONS: u32 = 1_000;

    #[test]
    fn test_hash_then_verify() {
        let stored = hash_password("correct horse", TEST_ITERATIONS);
        assert!(stored.starts_with("pbkdf2_sha256$1000$"));
        assert!(verify_password("correct horse", &stored).unwrap());
        assert!(!verify_password("wrong horse", &stored).unwrap());
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let a = hash_password("secret123", TEST_ITERATIONS);
        let b = hash_password("secret123", TEST_ITERATIONS);
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_error() {
        assert!(verify_password("x", "plaintext").is_err());
        assert!(verify_password("x", "md5$1$abc$def").is_err());
        assert!(verify_password("x", "pbkdf2_sha256$many$abc$def").is_err());
    }

    #[test]
    fn test_token_digest_depends_on_key() {
        let token = session_token();
        let a = token_digest(b"first-key", &token).unwrap();
        assert_eq!(a.len(), 64);
        assert_eq!(a, token_digest(b"first-key", &token).unwrap());
        assert_ne!(a, token_digest(b"second-key", &token).unwrap());
    }

    #[test]
    fn test_reset_token_shape() {
        let token = reset_token();
        assert_eq!(token.len(), RESET_TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_session_token_is_url_safe() {
        let token = session_token();
        assert_eq!(token.len(), 43);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(token, session_token());
    }

    #[test]
    fn test_token_digest_is_hmac_sha256_hex() {
        // RFC 4231, test case 2
        let digest = token_digest(b"Jefe", "what do ya want for nothing?").unwrap();
        assert_eq!(
            digest,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }
}

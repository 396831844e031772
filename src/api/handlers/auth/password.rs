//! Argon2id password hashing.
//!
//! Digests are PHC strings (`$argon2id$v=19$...`) so parameters and salt travel
//! with the hash. Verification goes through `argon2`'s own verifier, which
//! compares in constant time.

use anyhow::{Context, Result, anyhow};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use once_cell::sync::Lazy;
use rand::{RngCore, rngs::OsRng};

const SALT_LEN: usize = 16;

/// Digest of a throwaway password, hashed once with the default parameters.
/// Verifying against it costs the same as verifying a real user's digest.
pub(crate) static DUMMY_DIGEST: Lazy<String> =
    Lazy::new(|| hash_password("roster-unknown-user").unwrap_or_default());

/// Hash `plaintext` with a fresh random salt.
///
/// # Errors
/// Returns an error only if the OS random source fails or Argon2 rejects its inputs.
pub fn hash_password(plaintext: &str) -> Result<String> {
    let mut salt = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .context("failed to generate password salt")?;
    let salt = SaltString::encode_b64(&salt).map_err(|err| anyhow!("invalid salt: {err}"))?;

    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| anyhow!("failed to hash password: {err}"))
}

/// Returns `true` only when `plaintext` matches `digest`.
/// A digest that does not parse is a mismatch, not an error.
#[must_use]
pub fn verify_password(plaintext: &str, digest: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(digest) else {
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() -> Result<()> {
        let digest = hash_password("correct horse")?;
        assert!(digest.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &digest));
        assert!(!verify_password("wrong horse", &digest));
        Ok(())
    }

    #[test]
    fn salts_differ_per_hash() -> Result<()> {
        let first = hash_password("same")?;
        let second = hash_password("same")?;
        assert_ne!(first, second);
        assert!(verify_password("same", &first));
        assert!(verify_password("same", &second));
        Ok(())
    }

    #[test]
    fn dummy_digest_is_a_real_argon2id_digest() {
        assert!(DUMMY_DIGEST.starts_with("$argon2id$"));
        assert!(PasswordHash::new(&DUMMY_DIGEST).is_ok());
        assert!(!verify_password("", &DUMMY_DIGEST));
        assert!(!verify_password("correct", &DUMMY_DIGEST));
    }

    #[test]
    fn malformed_digest_is_a_mismatch() {
        assert!(!verify_password("anything", ""));
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", "$2a$10$abcdefghijklmnopqrstuv"));
    }
}

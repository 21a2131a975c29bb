//! Password hashing and verification.
//!
//! New digests are Argon2id PHC strings with a per-call random salt.
//! Digests written by the previous storage format (unsalted SHA-256,
//! lowercase hex) still verify; [`PasswordCodec::needs_rehash`] reports
//! them so callers can upgrade on the next successful login.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sha2::{Digest, Sha256};
use std::sync::LazyLock;
use thiserror::Error;

const LEGACY_DIGEST_LEN: usize = 64;

/// Argon2 digest of a throwaway password, verified against when there is
/// no stored digest so both outcomes cost one Argon2 run.
static DUMMY_DIGEST: LazyLock<Option<String>> =
    LazyLock::new(|| PasswordCodec.hash("unused-placeholder-password").ok());

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password cannot be empty")]
    EmptyInput,

    #[error("password hashing failed: {0}")]
    Hash(String),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordCodec;

impl PasswordCodec {
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password. Empty input is rejected.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        if plaintext.is_empty() {
            return Err(PasswordError::EmptyInput);
        }

        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }

    /// Check `plaintext` against a stored digest. Never errors: an
    /// unparsable digest is simply a mismatch.
    pub fn verify(&self, digest: &str, plaintext: &str) -> bool {
        if is_legacy_digest(digest) {
            return legacy_digest(plaintext).eq_ignore_ascii_case(digest);
        }

        match PasswordHash::new(digest) {
            Ok(parsed) => Argon2::default()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Run a full Argon2 verification against a placeholder digest and
    /// discard the result. Used when the account does not exist.
    pub fn verify_placeholder(&self, plaintext: &str) {
        if let Some(digest) = DUMMY_DIGEST.as_deref() {
            let _ = self.verify(digest, plaintext);
        }
    }

    /// True for digests in the legacy unsalted format.
    pub fn needs_rehash(&self, digest: &str) -> bool {
        is_legacy_digest(digest)
    }
}

/// Unsalted SHA-256 hex digest, the format older records were stored in.
pub fn legacy_digest(plaintext: &str) -> String {
    const_hex::encode(Sha256::digest(plaintext.as_bytes()))
}

fn is_legacy_digest(digest: &str) -> bool {
    digest.len() == LEGACY_DIGEST_LEN && digest.bytes().all(|b| b.is_ascii_hexdigit())
}

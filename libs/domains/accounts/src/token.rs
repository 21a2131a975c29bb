//! Session tokens: HS256 JWTs binding a user id to an expiry.
//!
//! There is no server-side session store. A token is valid until it
//! expires; it cannot be revoked earlier.

use chrono::{Duration, Utc};
use core_config::{ConfigError, FromEnv, env_parse_or_default, env_required};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::UserId;

/// Seven days
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 604_800;

/// One year
pub const MAX_SESSION_TTL_SECONDS: i64 = 31_536_000;

const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("failed to sign session token: {0}")]
    Signing(String),

    #[error("session token has expired")]
    Expired,

    #[error("session token signature is invalid")]
    InvalidSignature,

    #[error("session token is malformed")]
    Malformed,
}

/// Session signing configuration.
///
/// Loaded from environment variables:
/// - `JWT_SECRET` (required), at least 32 characters
/// - `JWT_EXPIRATION_IN_SECONDS` (optional), defaults to 7 days
#[derive(Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl: Duration,
}

impl SessionConfig {
    /// # Panics
    /// Panics if the secret is shorter than 32 characters.
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        assert!(
            secret.len() >= MIN_SECRET_LEN,
            "JWT secret must be at least 32 characters"
        );
        Self {
            secret,
            ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECONDS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl FromEnv for SessionConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;

        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::ParseError {
                key: "JWT_SECRET".to_string(),
                details: format!(
                    "must be at least 32 characters for security (got {}). Generate one with: openssl rand -base64 32",
                    secret.len()
                ),
            });
        }

        let ttl_seconds: i64 =
            env_parse_or_default("JWT_EXPIRATION_IN_SECONDS", DEFAULT_SESSION_TTL_SECONDS)?;
        let ttl = Some(ttl_seconds)
            .filter(|s| (1..=MAX_SESSION_TTL_SECONDS).contains(s))
            .and_then(Duration::try_seconds)
            .ok_or_else(|| ConfigError::ParseError {
                key: "JWT_EXPIRATION_IN_SECONDS".to_string(),
                details: format!(
                    "must be between 1 and {} seconds (got {})",
                    MAX_SESSION_TTL_SECONDS, ttl_seconds
                ),
            })?;

        Ok(Self { secret, ttl })
    }
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String, // user id
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Clone)]
pub struct SessionTokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SessionTokenIssuer {
    pub fn new(config: &SessionConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            ttl: config.ttl,
        }
    }

    /// Mint a token for `user_id` expiring at now + TTL.
    pub fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Signing("session expiry is out of range".to_string()))?;

        let claims = SessionClaims {
            sub: user_id.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Check signature and expiry, returning the decoded claims.
    pub fn decode_claims(&self, token: &str) -> Result<SessionClaims, TokenError> {
        decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })
    }

    /// Check signature and expiry, returning the user id the token was issued for.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let claims = self.decode_claims(token)?;
        claims.sub.parse().map_err(|_| TokenError::Malformed)
    }
}

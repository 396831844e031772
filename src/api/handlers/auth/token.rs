//! HS256 bearer token codec.
//!
//! Tokens are compact JWTs (`header.payload.signature`, base64url without
//! padding). Verification runs in a fixed order so each failure has exactly one
//! classification:
//!
//! 1. structure: three segments, JSON object header and payload;
//! 2. signature: HMAC-SHA256 over the received `header.payload` bytes;
//! 3. expiration: `exp` must be an integer strictly greater than `now`.
//!
//! No other claim is required here. The middleware decides which identity
//! claims a request needs.

use base64ct::{Base64UrlUnpadded, Encoding};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::{Map, Value};
use std::{
    fmt,
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use thiserror::Error;

pub type Claims = Map<String, Value>;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token")]
    MalformedToken,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    TokenExpired,
    #[error("claims must serialize to a JSON object")]
    ClaimsShape,
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Signs and verifies bearer tokens with one shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign `claims` with `exp = now + ttl`. Any `exp` already present is replaced.
    ///
    /// # Errors
    /// Returns `ClaimsShape` if `claims` is not a JSON object and `Signing` if
    /// the signer fails.
    pub fn issue<C: Serialize>(&self, claims: &C, now: u64) -> Result<String, TokenError> {
        let Ok(Value::Object(mut payload)) = serde_json::to_value(claims) else {
            return Err(TokenError::ClaimsShape);
        };
        payload.insert(
            "exp".to_string(),
            Value::from(now.saturating_add(self.ttl.as_secs())),
        );

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &payload, &self.encoding)
            .map_err(TokenError::Signing)
    }

    /// Verify `token` as of `now` (epoch seconds) and return its claims.
    ///
    /// # Errors
    /// Returns `MalformedToken`, `InvalidSignature` or `TokenExpired`.
    pub fn verify(&self, token: &str, now: u64) -> Result<Claims, TokenError> {
        check_structure(token)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|err| classify(err.kind()))?;
        let claims = data.claims;

        let exp = claims
            .get("exp")
            .and_then(Value::as_u64)
            .ok_or(TokenError::MalformedToken)?;
        if exp <= now {
            return Err(TokenError::TokenExpired);
        }

        Ok(claims)
    }
}

/// Seconds since the Unix epoch; a clock before 1970 reads as zero.
#[must_use]
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

fn check_structure(token: &str) -> Result<(), TokenError> {
    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenError::MalformedToken);
    };
    if signature.is_empty() {
        return Err(TokenError::MalformedToken);
    }

    let header = decode_object(header)?;
    decode_object(payload)?;

    // Any algorithm other than ours cannot carry a signature we accept.
    match header.get("alg").and_then(Value::as_str) {
        Some("HS256") => Ok(()),
        Some(_) => Err(TokenError::InvalidSignature),
        None => Err(TokenError::MalformedToken),
    }
}

fn decode_object(segment: &str) -> Result<Claims, TokenError> {
    let bytes = Base64UrlUnpadded::decode_vec(segment).map_err(|_| TokenError::MalformedToken)?;
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(TokenError::MalformedToken),
    }
}

// Header and payload already decoded in `check_structure`, so a base64 failure
// here can only come from the signature segment.
fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm | ErrorKind::Base64(_) => {
            TokenError::InvalidSignature
        }
        ErrorKind::ExpiredSignature => TokenError::TokenExpired,
        _ => TokenError::MalformedToken,
    }
}

//! Random public slugs for sessions.
//!
//! A slug is `length` bytes from the OS CSPRNG, hex-encoded. Uniqueness is
//! owned by the `sessions_slug_key` constraint: the existence pre-check only
//! saves a round trip, and a constraint violation on insert counts as one more
//! collision. Attempts are bounded; the byte length doubles every
//! `max_attempts / 2` collisions.

use anyhow::Context;
use rand::{RngCore, rngs::OsRng};
use tracing::{debug, error, warn};

use super::storage::{CreateSessionError, NewSession, SessionRecord, SessionStore};
use crate::api::{
    error::ApiError,
    handlers::auth::{AuthConfig, ROLE_OWNER},
};

const MAX_SLUG_BYTES: usize = 64;

pub(crate) trait SlugSource: Send + Sync {
    /// `length` random bytes, hex-encoded.
    fn generate(&self, length: usize) -> anyhow::Result<String>;
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct OsRngSlugs;

impl SlugSource for OsRngSlugs {
    fn generate(&self, length: usize) -> anyhow::Result<String> {
        let mut bytes = vec![0u8; length];
        OsRng
            .try_fill_bytes(&mut bytes)
            .context("OS random source unavailable")?;
        Ok(hex::encode(bytes))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SlugPolicy {
    initial_length: usize,
    max_attempts: u32,
}

impl SlugPolicy {
    pub(crate) fn new(initial_length: usize, max_attempts: u32) -> Self {
        Self {
            initial_length: initial_length.clamp(1, MAX_SLUG_BYTES),
            max_attempts: max_attempts.max(1),
        }
    }

    pub(crate) fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.slug_length(), config.slug_max_attempts())
    }

    /// Byte length for the zero-based `attempt`.
    pub(crate) fn length_for(&self, attempt: u32) -> usize {
        let step = (self.max_attempts / 2).max(1);
        let doublings = (attempt / step).min(usize::BITS - 1);
        self.initial_length
            .saturating_mul(1usize << doublings)
            .min(MAX_SLUG_BYTES)
    }
}

/// Allocate a fresh slug and create the session plus its owner room.
///
/// # Errors
/// `Conflict` once every attempt collided, `Internal` for random-source,
/// store or missing-role failures.
pub(crate) async fn allocate_unique_slug<S, G>(
    store: &S,
    slugs: &G,
    policy: SlugPolicy,
    session: &NewSession,
) -> Result<SessionRecord, ApiError>
where
    S: SessionStore,
    G: SlugSource,
{
    for attempt in 0..policy.max_attempts {
        let length = policy.length_for(attempt);
        let slug = slugs.generate(length).map_err(|err| {
            error!("Failed to generate slug: {err:#}");
            ApiError::internal(err)
        })?;

        if store.slug_exists(&slug).await.map_err(ApiError::internal)? {
            debug!(attempt, length, "Slug collision on pre-check");
            continue;
        }

        match store.insert_with_owner(session, &slug).await {
            Ok(record) => return Ok(record),
            Err(CreateSessionError::SlugTaken) => {
                debug!(attempt, length, "Slug collision on insert");
            }
            Err(CreateSessionError::MissingOwnerRole) => {
                error!("Role '{ROLE_OWNER}' is not seeded");
                return Err(ApiError::internal(anyhow::anyhow!("owner role missing")));
            }
            Err(CreateSessionError::Store(err)) => return Err(ApiError::internal(err)),
        }
    }

    warn!(
        attempts = policy.max_attempts,
        "Slug allocation exhausted all attempts"
    );
    Err(ApiError::Conflict("Could not allocate a unique slug."))
}

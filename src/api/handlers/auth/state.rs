//! Auth configuration and the shared state built from it at startup.

use secrecy::SecretString;
use std::time::Duration;

use super::token::TokenCodec;

const DEFAULT_TOKEN_TTL_HOURS: u64 = 72;
const DEFAULT_SLUG_LENGTH: usize = 5;
const DEFAULT_SLUG_MAX_ATTEMPTS: u32 = 10;
const SECONDS_PER_HOUR: u64 = 60 * 60;

#[derive(Debug)]
pub struct AuthConfig {
    token_signing_key: SecretString,
    token_ttl_hours: u64,
    slug_length: usize,
    slug_max_attempts: u32,
}

impl AuthConfig {
    #[must_use]
    pub fn new(token_signing_key: SecretString) -> Self {
        Self {
            token_signing_key,
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            slug_length: DEFAULT_SLUG_LENGTH,
            slug_max_attempts: DEFAULT_SLUG_MAX_ATTEMPTS,
        }
    }

    #[must_use]
    pub fn with_token_ttl_hours(mut self, hours: u64) -> Self {
        self.token_ttl_hours = hours.max(1);
        self
    }

    #[must_use]
    pub fn with_slug_length(mut self, bytes: usize) -> Self {
        self.slug_length = bytes.max(1);
        self
    }

    #[must_use]
    pub fn with_slug_max_attempts(mut self, attempts: u32) -> Self {
        self.slug_max_attempts = attempts.max(1);
        self
    }

    #[must_use]
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_hours.saturating_mul(SECONDS_PER_HOUR))
    }

    #[must_use]
    pub fn slug_length(&self) -> usize {
        self.slug_length
    }

    #[must_use]
    pub fn slug_max_attempts(&self) -> u32 {
        self.slug_max_attempts
    }
}

/// Read-only after startup; shared by every request through `Extension<Arc<AuthState>>`.
#[derive(Debug)]
pub struct AuthState {
    config: AuthConfig,
    codec: TokenCodec,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        let codec = TokenCodec::new(&config.token_signing_key, config.token_ttl());
        Self { config, codec }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_overrides() {
        let config = AuthConfig::new(SecretString::from("secret"));
        assert_eq!(config.token_ttl(), Duration::from_secs(72 * 3600));
        assert_eq!(config.slug_length(), 5);
        assert_eq!(config.slug_max_attempts(), 10);

        let config = config
            .with_token_ttl_hours(2)
            .with_slug_length(8)
            .with_slug_max_attempts(3);
        assert_eq!(config.token_ttl(), Duration::from_secs(7200));
        assert_eq!(config.slug_length(), 8);
        assert_eq!(config.slug_max_attempts(), 3);
    }

    #[test]
    fn zero_values_are_clamped() {
        let config = AuthConfig::new(SecretString::from("secret"))
            .with_token_ttl_hours(0)
            .with_slug_length(0)
            .with_slug_max_attempts(0);
        assert_eq!(config.token_ttl(), Duration::from_secs(3600));
        assert_eq!(config.slug_length(), 1);
        assert_eq!(config.slug_max_attempts(), 1);
    }

    #[test]
    fn state_codec_uses_config_ttl() {
        let state = AuthState::new(AuthConfig::new(SecretString::from("k")).with_token_ttl_hours(5));
        assert_eq!(state.codec().ttl(), Duration::from_secs(5 * 3600));
        assert!(!format!("{state:?}").contains("\"k\""));
    }
}

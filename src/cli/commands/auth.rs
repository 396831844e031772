use anyhow::{Context, Result};
use clap::{Arg, Command};
use secrecy::SecretString;

pub const ARG_TOKEN_SIGNING_KEY: &str = "token-signing-key";
pub const ARG_TOKEN_TTL_HOURS: &str = "token-ttl-hours";
pub const ARG_SLUG_LENGTH: &str = "slug-length";
pub const ARG_SLUG_MAX_ATTEMPTS: &str = "slug-max-attempts";
pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";

#[must_use]
pub fn with_args(command: Command) -> Command {
    let command = with_token_args(command);
    with_slug_args(command)
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Frontend base URL allowed by CORS")
                .env("ROSTER_FRONTEND_BASE_URL"),
        )
}

fn with_token_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_SIGNING_KEY)
                .long(ARG_TOKEN_SIGNING_KEY)
                .help("Shared secret used to sign and verify bearer tokens")
                .env("ROSTER_TOKEN_SIGNING_KEY")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_HOURS)
                .long(ARG_TOKEN_TTL_HOURS)
                .help("Bearer token lifetime in hours")
                .env("ROSTER_TOKEN_TTL_HOURS")
                .default_value("72")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}

fn with_slug_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SLUG_LENGTH)
                .long(ARG_SLUG_LENGTH)
                .help("Random bytes per session slug (hex doubles the visible length)")
                .env("ROSTER_SLUG_LENGTH")
                .default_value("5")
                .value_parser(clap::value_parser!(u8).range(1..=32)),
        )
        .arg(
            Arg::new(ARG_SLUG_MAX_ATTEMPTS)
                .long(ARG_SLUG_MAX_ATTEMPTS)
                .help("Slug allocation attempts before giving up")
                .env("ROSTER_SLUG_MAX_ATTEMPTS")
                .default_value("10")
                .value_parser(clap::value_parser!(u32).range(1..=64)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub token_signing_key: SecretString,
    pub token_ttl_hours: u64,
    pub slug_length: usize,
    pub slug_max_attempts: u32,
    pub frontend_base_url: Option<String>,
}

impl Options {
    /// Collect auth and slug options from validated matches.
    ///
    /// # Errors
    /// Returns an error if the signing key is missing or empty.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let key = matches
            .get_one::<String>(ARG_TOKEN_SIGNING_KEY)
            .filter(|key| !key.trim().is_empty())
            .cloned()
            .context("missing required argument: --token-signing-key")?;

        Ok(Self {
            token_signing_key: SecretString::from(key),
            token_ttl_hours: matches
                .get_one::<u64>(ARG_TOKEN_TTL_HOURS)
                .copied()
                .unwrap_or(72),
            slug_length: matches
                .get_one::<u8>(ARG_SLUG_LENGTH)
                .copied()
                .map_or(5, usize::from),
            slug_max_attempts: matches
                .get_one::<u32>(ARG_SLUG_MAX_ATTEMPTS)
                .copied()
                .unwrap_or(10),
            frontend_base_url: matches.get_one::<String>(ARG_FRONTEND_BASE_URL).cloned(),
        })
    }
}

//! Command-line argument dispatch.
//!
//! Maps validated CLI arguments to the action to run, such as starting the API
//! server with its auth and slug configuration.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::auth;
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        token_signing_key: auth_opts.token_signing_key,
        token_ttl_hours: auth_opts.token_ttl_hours,
        slug_length: auth_opts.slug_length,
        slug_max_attempts: auth_opts.slug_max_attempts,
        frontend_base_url: auth_opts.frontend_base_url,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_signing_key_is_rejected() {
        temp_env::with_vars(
            [
                ("ROSTER_DSN", Some("postgres://user@localhost:5432/roster")),
                ("ROSTER_TOKEN_SIGNING_KEY", Some("   ")),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec!["roster"]);
                let result = handler(&matches);
                assert!(result.is_err());
                if let Err(err) = result {
                    assert!(
                        err.to_string()
                            .contains("missing required argument: --token-signing-key")
                    );
                }
            },
        );
    }

    #[test]
    fn server_action_carries_options() {
        temp_env::with_vars(
            [
                ("ROSTER_DSN", Some("postgres://user@localhost:5432/roster")),
                ("ROSTER_TOKEN_SIGNING_KEY", Some("secret")),
                ("ROSTER_PORT", Some("8181")),
                ("ROSTER_FRONTEND_BASE_URL", Some("https://app.roster.dev")),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec!["roster"]);
                let action = handler(&matches);
                assert!(action.is_ok());
                if let Ok(Action::Server(args)) = action {
                    assert_eq!(args.port, 8181);
                    assert_eq!(args.dsn, "postgres://user@localhost:5432/roster");
                    assert_eq!(
                        args.frontend_base_url.as_deref(),
                        Some("https://app.roster.dev")
                    );
                }
            },
        );
    }
}

use crate::api;
use anyhow::Result;
use secrecy::SecretString;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub token_signing_key: SecretString,
    pub token_ttl_hours: u64,
    pub slug_length: usize,
    pub slug_max_attempts: u32,
    pub frontend_base_url: Option<String>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = api::AuthConfig::new(args.token_signing_key)
        .with_token_ttl_hours(args.token_ttl_hours)
        .with_slug_length(args.slug_length)
        .with_slug_max_attempts(args.slug_max_attempts);

    debug!("Auth config: {:?}", auth_config);

    api::new(
        args.port,
        args.dsn,
        auth_config,
        args.frontend_base_url.as_deref(),
    )
    .await
}

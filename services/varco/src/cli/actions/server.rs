use crate::{api, auth::AuthConfig};
use anyhow::Result;
use secrecy::SecretString;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub redis_url: String,
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_seconds: u64,
    pub refresh_ttl_seconds: u64,
    pub max_failed_attempts: u32,
    pub issuer: String,
    pub audience: String,
    pub frontend_base_url: String,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database or session store cannot be reached, or the
/// server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let config = AuthConfig::new(
        SecretString::from(args.access_secret),
        SecretString::from(args.refresh_secret),
        args.frontend_base_url,
    )
    .with_access_ttl_seconds(args.access_ttl_seconds)
    .with_refresh_ttl_seconds(args.refresh_ttl_seconds)
    .with_max_failed_attempts(args.max_failed_attempts)
    .with_issuer(args.issuer)
    .with_audience(args.audience);

    debug!(port = args.port, "starting api server");

    api::new(args.port, args.dsn, args.redis_url, config).await
}

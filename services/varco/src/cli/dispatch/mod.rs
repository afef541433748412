//! Command-line argument dispatch and server initialization.
//!
//! Parses validated CLI arguments and maps them to the appropriate action,
//! such as starting the API server with its full configuration state.

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
    let redis_url = matches
        .get_one::<String>("redis-url")
        .cloned()
        .unwrap_or_else(|| "redis://127.0.0.1:6379".to_string());

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        redis_url,
        access_secret: auth_opts.access_secret,
        refresh_secret: auth_opts.refresh_secret,
        access_ttl_seconds: auth_opts.access_ttl_seconds,
        refresh_ttl_seconds: auth_opts.refresh_ttl_seconds,
        max_failed_attempts: auth_opts.max_failed_attempts,
        issuer: auth_opts.issuer,
        audience: auth_opts.audience,
        frontend_base_url: auth_opts.frontend_base_url,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_secret_required() {
        temp_env::with_vars(
            [
                ("VARCO_DSN", Some("postgres://localhost/varco")),
                ("VARCO_ACCESS_TOKEN_SECRET", None::<&str>),
                ("VARCO_REFRESH_TOKEN_SECRET", Some("r-secret")),
            ],
            || {
                let command = crate::cli::commands::new();
                let result = command.try_get_matches_from(vec!["varco"]);
                assert!(result.is_err());
            },
        );
    }

    #[test]
    fn handler_builds_server_action() {
        temp_env::with_vars(
            [
                ("VARCO_DSN", Some("postgres://localhost/varco")),
                ("VARCO_ACCESS_TOKEN_SECRET", Some("a-secret")),
                ("VARCO_REFRESH_TOKEN_SECRET", Some("r-secret")),
                ("VARCO_ACCESS_TTL_SECONDS", Some("60")),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec!["varco"]);
                let action = handler(&matches).expect("server action");
                let Action::Server(args) = action;
                assert_eq!(args.port, 8080);
                assert_eq!(args.access_ttl_seconds, 60);
                assert_eq!(args.redis_url, "redis://127.0.0.1:6379");
            },
        );
    }
}

use anyhow::{Context, Result};
use clap::{Arg, Command};

#[must_use]
pub fn with_args(command: Command) -> Command {
    let command = with_secret_args(command);
    with_policy_args(command)
}

fn with_secret_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("access-token-secret")
                .long("access-token-secret")
                .help("HMAC secret used to sign access tokens")
                .env("VARCO_ACCESS_TOKEN_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new("refresh-token-secret")
                .long("refresh-token-secret")
                .help("HMAC secret used to sign refresh tokens")
                .env("VARCO_REFRESH_TOKEN_SECRET")
                .hide_env_values(true)
                .required(true),
        )
}

fn with_policy_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("access-ttl-seconds")
                .long("access-ttl-seconds")
                .help("Access token TTL in seconds")
                .env("VARCO_ACCESS_TTL_SECONDS")
                .default_value("900")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("refresh-ttl-seconds")
                .long("refresh-ttl-seconds")
                .help("Refresh token TTL in seconds")
                .env("VARCO_REFRESH_TTL_SECONDS")
                .default_value("604800")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("max-failed-attempts")
                .long("max-failed-attempts")
                .help("Failed logins allowed before the account is blocked")
                .env("VARCO_MAX_FAILED_ATTEMPTS")
                .default_value("5")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("token-issuer")
                .long("token-issuer")
                .help("Issuer claim embedded in signed tokens")
                .env("VARCO_TOKEN_ISSUER")
                .default_value("https://api.varco.dev"),
        )
        .arg(
            Arg::new("token-audience")
                .long("token-audience")
                .help("Audience claim embedded in signed tokens")
                .env("VARCO_TOKEN_AUDIENCE")
                .default_value("varco"),
        )
        .arg(
            Arg::new("frontend-base-url")
                .long("frontend-base-url")
                .help("Frontend base URL, drives CORS origin and cookie Secure flag")
                .env("VARCO_FRONTEND_BASE_URL")
                .default_value("http://localhost:5173"),
        )
}

#[derive(Debug)]
pub struct Options {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_seconds: u64,
    pub refresh_ttl_seconds: u64,
    pub max_failed_attempts: u32,
    pub issuer: String,
    pub audience: String,
    pub frontend_base_url: String,
}

impl Options {
    /// Extract the auth options from parsed matches.
    ///
    /// # Errors
    ///
    /// Returns an error if a required secret is missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let access_secret = matches
            .get_one::<String>("access-token-secret")
            .cloned()
            .context("missing required argument: --access-token-secret")?;
        let refresh_secret = matches
            .get_one::<String>("refresh-token-secret")
            .cloned()
            .context("missing required argument: --refresh-token-secret")?;

        Ok(Self {
            access_secret,
            refresh_secret,
            access_ttl_seconds: matches
                .get_one::<u64>("access-ttl-seconds")
                .copied()
                .unwrap_or(900),
            refresh_ttl_seconds: matches
                .get_one::<u64>("refresh-ttl-seconds")
                .copied()
                .unwrap_or(604_800),
            max_failed_attempts: matches
                .get_one::<u32>("max-failed-attempts")
                .copied()
                .unwrap_or(5),
            issuer: matches
                .get_one::<String>("token-issuer")
                .cloned()
                .unwrap_or_else(|| "https://api.varco.dev".to_string()),
            audience: matches
                .get_one::<String>("token-audience")
                .cloned()
                .unwrap_or_else(|| "varco".to_string()),
            frontend_base_url: matches
                .get_one::<String>("frontend-base-url")
                .cloned()
                .unwrap_or_else(|| "http://localhost:5173".to_string()),
        })
    }
}

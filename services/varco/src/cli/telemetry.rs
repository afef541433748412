//! Tracing subscriber setup.
//!
//! Verbosity from the CLI takes precedence; otherwise `RUST_LOG` is honored,
//! falling back to errors only.

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};

/// Initialize the global subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(verbosity_level: Option<Level>) -> Result<()> {
    let filter = verbosity_level.map_or_else(
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        |level| EnvFilter::default().add_directive(level.into()),
    );

    let subscriber = Registry::default().with(filter).with(fmt::layer());

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")
}

//! # Varco (Marketplace Session Service)
//!
//! `varco` is the authentication and session authority for the marketplace
//! backend. It issues short-lived HS256 access tokens paired with long-lived
//! refresh tokens, rotates the pair on every refresh (with replay detection),
//! throttles failed logins, and blacklists access tokens on logout.
//!
//! ## Session Model
//!
//! - **Single session per user:** at most one refresh token is redeemable per
//!   user at any time; a new login or rotation invalidates the previous one.
//! - **Stateless servers:** all cross-request state (sessions, failed-login
//!   counters, blacklist entries) lives in the session store, so any number of
//!   instances can serve traffic.
//! - **Silent renewal:** a cleanly expired access token accompanied by a valid
//!   refresh cookie is renewed in-flight; the replacement pair is emitted via
//!   the `Authorization` response header and an `HttpOnly` cookie.
//!
//! ## Login Throttling
//!
//! Each password mismatch increments a per-user counter in the session store.
//! The fifth consecutive mismatch flips the account inactive; only successful
//! logins reset the counter.

pub mod api;
pub mod auth;
pub mod cli;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

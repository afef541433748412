//! API handlers for the varco session service.

pub mod auth;
pub mod health;

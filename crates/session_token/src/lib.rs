//! Signed, expiring session tokens (HS256).
//!
//! A deliberately small codec: one declared algorithm, a fixed versioned
//! claims schema, and a structural-only decode for locating refresh sessions.

mod error;
mod jwt;

pub use error::Error;
pub use jwt::{Claims, TOKEN_VERSION, TokenHeader, decode_insecure, sign_hs256, verify_hs256};

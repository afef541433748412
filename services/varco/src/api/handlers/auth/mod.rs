//! Auth endpoint handlers.

pub mod login;
pub mod session;
pub mod types;
pub(crate) mod utils;

pub use login::login;
pub use session::{logout, session};

pub(crate) use crate::auth::guard::bearer_token;

//! Authentication module
//!
//! The API authenticates every request with a personal access token sent as
//! an `Authorization: Bearer` header.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::AuthConfig;

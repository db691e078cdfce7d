//! Authentication module
//!
//! Supports: static Bearer tokens, service account keys (JWT bearer grant)
//! and OAuth2 refresh tokens.
//!
//! The `Authenticator` applies credentials to outgoing requests and caches
//! access tokens until shortly before they expire.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthConfig, CachedToken, ServiceAccountKey, BIGQUERY_SCOPE, DEFAULT_TOKEN_URI};

#[cfg(test)]
mod tests;

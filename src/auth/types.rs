//! Auth configuration types

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// OAuth2 scope granting access to the warehouse tables and insert endpoint
pub const BIGQUERY_SCOPE: &str = "https://www.googleapis.com/auth/bigquery";

/// Token endpoint used when a key file does not name one
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Authentication configuration
#[derive(Debug, Clone, Default)]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    None,

    /// Pre-issued access token
    Bearer {
        /// The bearer token
        token: String,
    },

    /// Service account signing its own assertions (JWT bearer grant)
    ServiceAccount {
        /// Service account email (iss claim)
        client_email: String,
        /// Private key for signing (PEM format)
        private_key: String,
        /// Token endpoint (aud claim and exchange URL)
        token_uri: String,
        /// Requested scopes
        scopes: Vec<String>,
    },

    /// OAuth2 Refresh Token flow
    Oauth2Refresh {
        /// Token endpoint URL
        token_url: String,
        /// Client ID
        client_id: String,
        /// Client secret
        client_secret: String,
        /// Refresh token
        refresh_token: String,
    },
}

impl AuthConfig {
    /// Service account credentials scoped to the warehouse
    pub fn service_account(key: ServiceAccountKey) -> Self {
        AuthConfig::ServiceAccount {
            client_email: key.client_email,
            private_key: key.private_key,
            token_uri: key.token_uri,
            scopes: vec![BIGQUERY_SCOPE.to_string()],
        }
    }
}

/// Service account key file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Parse a key from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::auth(format!("Invalid service account key: {e}")))
    }

    /// Read a key file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}

/// Cached token with expiration
#[derive(Debug, Clone)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { token, expires_at }
    }

    /// Create a token that expires in N seconds from now
    pub fn expires_in(token: String, seconds: i64) -> Self {
        let expires_at = Utc::now() + chrono::Duration::seconds(seconds);
        Self {
            token,
            expires_at: Some(expires_at),
        }
    }

    /// Check if the token is expired (with 30 second buffer)
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let buffer = chrono::Duration::seconds(30);
                Utc::now() + buffer >= expires_at
            }
            None => false, // No expiration = never expires
        }
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_cached_token_not_expired() {
        let token = CachedToken::expires_in("test".to_string(), 3600);
        assert!(!token.is_expired());
    }

    #[test]
    fn test_cached_token_expired() {
        let token = CachedToken::expires_in("test".to_string(), -100);
        assert!(token.is_expired());
    }

    #[test]
    fn test_cached_token_within_buffer_is_expired() {
        let token = CachedToken::expires_in("test".to_string(), 10);
        assert!(token.is_expired());
    }

    #[test]
    fn test_cached_token_no_expiration() {
        let token = CachedToken::new("test".to_string(), None);
        assert!(!token.is_expired());
    }

    #[test]
    fn test_service_account_key_defaults_token_uri() {
        let key = ServiceAccountKey::from_json(
            r#"{"private_key": "pem", "client_email": "svc@project.iam.gserviceaccount.com"}"#,
        )
        .unwrap();
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);

        match AuthConfig::service_account(key) {
            AuthConfig::ServiceAccount { scopes, .. } => {
                assert_eq!(scopes, vec![BIGQUERY_SCOPE.to_string()]);
            }
            other => panic!("unexpected config: {other:?}"),
        }
    }

    #[test]
    fn test_service_account_key_missing_fields() {
        let err = ServiceAccountKey::from_json(r#"{"client_email": "a@b"}"#).unwrap_err();
        assert!(err.to_string().contains("Invalid service account key"));
    }
}

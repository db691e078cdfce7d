//! Client providers
//!
//! The table creator and the ingestion coordinator take a `ClientProvider`
//! at construction instead of reaching for a global client.

use super::client::{HttpClient, HttpClientConfig};
use crate::auth::AuthConfig;
use crate::error::Result;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::debug;

/// Source of the authenticated client used for warehouse calls
pub trait ClientProvider: Send + Sync {
    /// Get a ready-to-use client
    fn client(&self) -> Result<Arc<HttpClient>>;
}

/// Builds the client on first use and hands out the same instance afterwards
pub struct LazyClientProvider {
    config: HttpClientConfig,
    auth: AuthConfig,
    cell: OnceCell<Arc<HttpClient>>,
}

impl LazyClientProvider {
    pub fn new(config: HttpClientConfig, auth: AuthConfig) -> Self {
        Self {
            config,
            auth,
            cell: OnceCell::new(),
        }
    }

    /// Whether the client has been constructed yet
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl ClientProvider for LazyClientProvider {
    fn client(&self) -> Result<Arc<HttpClient>> {
        self.cell
            .get_or_try_init(|| {
                debug!("Constructing warehouse HTTP client");
                HttpClient::with_auth(self.config.clone(), self.auth.clone()).map(Arc::new)
            })
            .cloned()
    }
}

impl std::fmt::Debug for LazyClientProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyClientProvider")
            .field("config", &self.config)
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

/// Wraps a prebuilt client
#[derive(Debug, Clone)]
pub struct StaticClientProvider {
    client: Arc<HttpClient>,
}

impl StaticClientProvider {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl From<Arc<HttpClient>> for StaticClientProvider {
    fn from(client: Arc<HttpClient>) -> Self {
        Self { client }
    }
}

impl ClientProvider for StaticClientProvider {
    fn client(&self) -> Result<Arc<HttpClient>> {
        Ok(Arc::clone(&self.client))
    }
}

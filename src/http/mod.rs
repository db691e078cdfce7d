//! HTTP client module
//!
//! Provides the authenticated HTTP client used to reach the warehouse, and
//! the `ClientProvider` seam through which callers hand it to the table
//! creator and the ingestion coordinator.
//!
//! Nothing here retries. A failed request surfaces to the caller, who owns
//! retry and deadline policy.

mod client;
mod provider;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use provider::{ClientProvider, LazyClientProvider, StaticClientProvider};

#[cfg(test)]
mod tests;

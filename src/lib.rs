// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # kindsync
//!
//! Exports entities of a schema-less datastore into warehouse tables.
//!
//! ## Features
//!
//! - **Schema Inference**: column types and repetition derived from the
//!   datastore's own kind and property statistics
//! - **Record Normalization**: flat rows with sanitized column names, blob
//!   placeholders and an ingestion timestamp
//! - **Streaming Ingestion**: one `insertAll` call per batch, with per-row
//!   failures folded into a single error
//! - **Pluggable Clients**: the authenticated HTTP client is injected, never global
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kindsync::{Ingestor, SchemaInferrer, SyncConfig, TableCreator, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = SyncConfig::from_file("sync.yaml")?;
//!     config.validate()?;
//!     let provider = config.client_provider()?;
//!
//!     // Create the destination table from statistics
//!     let inferrer = SchemaInferrer::new(config.stats_source()?);
//!     let creator = TableCreator::new(inferrer, provider.clone(), config.target());
//!     creator.create_table_for_kind("Person").await?;
//!
//!     // Stream a batch of exported records
//!     let ingestor = Ingestor::new(provider, config.target()).with_exclude(&config.exclude);
//!     ingestor.ingest_json(records).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌────────────────────┐
//! │  StatsSource │──▶│  SchemaInferrer  │──▶│    TableCreator    │
//! │ memory/duckdb│   │ type map, repeat │   │  bigquery#table    │
//! └──────────────┘   └──────────────────┘   └─────────┬──────────┘
//!                                                     │ ClientProvider
//! ┌──────────────┐   ┌──────────────────┐   ┌─────────┴──────────┐
//! │    Record    │──▶│    Normalizer    │──▶│      Ingestor      │
//! │ key + values │   │ exclude, rename  │   │ insertAll, errors  │
//! └──────────────┘   └──────────────────┘   └────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Datastore statistics sources
pub mod stats;

/// Schema inference from statistics
pub mod schema;

/// Record model and normalization
pub mod record;

/// Authentication implementations
pub mod auth;

/// Authenticated HTTP client and client providers
pub mod http;

/// Table creation and streaming ingestion
pub mod warehouse;

/// Run configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::SyncConfig;
pub use record::{EntityKey, Normalizer, PropertyValue, Record};
pub use schema::{SchemaInferrer, TableSchema};
pub use warehouse::{Ingestor, TableCreator, WarehouseTarget};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

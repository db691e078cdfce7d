//! Error types for kindsync
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use std::fmt::Write as _;
use thiserror::Error;

use crate::warehouse::RowFailure;

/// The main error type for kindsync
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Upstream Data Errors
    // ============================================================================
    #[error("No stats for kind '{kind}'")]
    KindStatsNotFound { kind: String },

    #[error("Can't load property stats for '{kind}': {message}")]
    PropertyStats { kind: String, message: String },

    #[error("Statistics query failed: {message}")]
    Stats { message: String },

    #[error("No statistics source configured")]
    StatsUnavailable,

    #[error("Failed to decode record: {message}")]
    RecordDecode { message: String },

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("Token refresh failed: {message}")]
    TokenRefresh { message: String },

    #[error("JWT generation failed: {message}")]
    JwtGeneration { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Partial Remote Failures
    // ============================================================================
    #[error("{}", format_insert_errors(.failures))]
    InsertErrors { failures: Vec<RowFailure> },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create a missing kind statistics error
    pub fn kind_not_found(kind: impl Into<String>) -> Self {
        Self::KindStatsNotFound { kind: kind.into() }
    }

    /// Create a property statistics error
    pub fn property_stats(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PropertyStats {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create a statistics query error
    pub fn stats(message: impl Into<String>) -> Self {
        Self::Stats {
            message: message.into(),
        }
    }

    /// Create a record decoding error
    pub fn record_decode(message: impl Into<String>) -> Self {
        Self::RecordDecode {
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Check whether the caller may reasonably retry the whole cycle.
    ///
    /// Nothing in this crate retries on its own; this only classifies.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout() || e.is_connect(),
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Render the aggregate message for rows rejected by the insert endpoint
fn format_insert_errors(failures: &[RowFailure]) -> String {
    let mut buf = String::from("Insert errors when ingesting:\n");
    for failure in failures {
        let _ = writeln!(buf, "Errors at row index {}:", failure.index);
        for detail in &failure.errors {
            let _ = writeln!(buf, "  - {detail}");
        }
    }
    buf
}

/// Result type alias for kindsync
pub type Result<T> = std::result::Result<T, Error>;

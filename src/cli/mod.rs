//! CLI module
//!
//! Command-line interface for export runs.
//!
//! # Commands
//!
//! - `schema` - Print the schema inferred for a kind
//! - `create-table` - Create the warehouse table of a kind
//! - `ingest` - Stream a file of exported records into the warehouse
//! - `serve` - Start the HTTP trigger server

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands};
pub use runner::{parse_records, Runner};
pub use server::{router, serve, ServerConfig};

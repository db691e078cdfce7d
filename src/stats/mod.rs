//! Datastore statistics module
//!
//! The operational store keeps aggregate counters about itself in two
//! statistic kinds: one entry per kind, and one entry per
//! (kind, property name, property type) triple. This module models those
//! entries and the read-only query interface used to fetch them.
//!
//! # Sources
//!
//! - **MemoryStats**: in-memory entries, optionally loaded from a JSON dump
//! - **DuckDbStats**: statistic tables stored in a DuckDB database

mod duckdb;
mod memory;
mod source;
mod types;

pub use self::duckdb::DuckDbStats;
pub use memory::{MemoryStats, StatsDump};
pub use source::{PropertyStatStream, StatsSource};
pub use types::{KindStat, PropertyStat, STAT_BY_KIND_TABLE, STAT_BY_PROPERTY_TABLE};

//! DuckDB-backed statistics source
//!
//! Reads the two statistic tables from a DuckDB database. Exports of the
//! store's statistic kinds land there as plain tables named after the kinds.

use super::source::{PropertyStatStream, StatsSource};
use super::types::{KindStat, PropertyStat, STAT_BY_KIND_TABLE, STAT_BY_PROPERTY_TABLE};
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use duckdb::{params, AccessMode, Config, Connection};
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Statistics source backed by a DuckDB connection
pub struct DuckDbStats {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDbStats {
    /// Open a database file read-only
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let config = Config::default()
            .access_mode(AccessMode::ReadOnly)
            .map_err(|e| Error::stats(format!("Invalid DuckDB config: {e}")))?;
        let conn = Connection::open_with_flags(path, config)
            .map_err(|e| Error::stats(format!("Failed to open DuckDB database: {e}")))?;

        debug!("Opened statistics database {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open or create a database file for loading statistics
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| Error::stats(format!("Failed to open DuckDB database: {e}")))?;
        let stats = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        stats.create_tables()?;
        Ok(stats)
    }

    /// Create an empty in-memory database
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::stats(format!("Failed to create DuckDB connection: {e}")))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create both statistic tables if they do not exist yet
    pub fn create_tables(&self) -> Result<()> {
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS "{STAT_BY_KIND_TABLE}" (
                kind_name VARCHAR NOT NULL,
                "count" BIGINT,
                entity_bytes BIGINT,
                builtin_index_bytes BIGINT,
                builtin_index_count BIGINT,
                composite_index_bytes BIGINT,
                composite_index_count BIGINT,
                "timestamp" TIMESTAMP
            );
            CREATE TABLE IF NOT EXISTS "{STAT_BY_PROPERTY_TABLE}" (
                kind_name VARCHAR NOT NULL,
                property_name VARCHAR NOT NULL,
                property_type VARCHAR NOT NULL,
                "count" BIGINT,
                bytes BIGINT,
                builtin_index_bytes BIGINT,
                builtin_index_count BIGINT,
                "timestamp" TIMESTAMP
            );
            "#
        );
        self.lock()?
            .execute_batch(&sql)
            .map_err(|e| Error::stats(format!("Failed to create statistic tables: {e}")))
    }

    /// Insert one kind statistics row
    pub fn insert_kind(&self, stat: &KindStat) -> Result<()> {
        let sql = format!(
            r#"INSERT INTO "{STAT_BY_KIND_TABLE}" VALUES (?, ?, ?, ?, ?, ?, ?, epoch_ms(CAST(? AS BIGINT)))"#
        );
        self.lock()?
            .execute(
                &sql,
                params![
                    stat.kind,
                    stat.count,
                    stat.entity_bytes,
                    stat.index_bytes,
                    stat.index_count,
                    stat.composite_index_bytes,
                    stat.composite_index_count,
                    stat.timestamp.map(|t| t.timestamp_millis()),
                ],
            )
            .map_err(|e| Error::stats(format!("Failed to insert kind stats: {e}")))?;
        Ok(())
    }

    /// Insert one property statistics row
    pub fn insert_property(&self, stat: &PropertyStat) -> Result<()> {
        let sql = format!(
            r#"INSERT INTO "{STAT_BY_PROPERTY_TABLE}" VALUES (?, ?, ?, ?, ?, ?, ?, epoch_ms(CAST(? AS BIGINT)))"#
        );
        self.lock()?
            .execute(
                &sql,
                params![
                    stat.kind,
                    stat.name,
                    stat.property_type,
                    stat.count,
                    stat.bytes,
                    stat.index_bytes,
                    stat.index_count,
                    stat.timestamp.map(|t| t.timestamp_millis()),
                ],
            )
            .map_err(|e| Error::stats(format!("Failed to insert property stats: {e}")))?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::stats("DuckDB connection lock poisoned"))
    }

    /// Run a query on the blocking pool
    async fn run_blocking<T, F>(&self, query: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| Error::stats("DuckDB connection lock poisoned"))?;
            query(&guard)
        })
        .await
        .map_err(|e| Error::stats(format!("Statistics query task failed: {e}")))?
    }
}

impl std::fmt::Debug for DuckDbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDbStats").finish_non_exhaustive()
    }
}

#[async_trait]
impl StatsSource for DuckDbStats {
    async fn kind_stat(&self, kind: &str) -> Result<Option<KindStat>> {
        let kind = kind.to_string();
        self.run_blocking(move |conn| query_kind(conn, &kind)).await
    }

    fn property_stats<'a>(&'a self, kind: &'a str) -> PropertyStatStream<'a> {
        let owned = kind.to_string();
        stream::once(self.run_blocking(move |conn| Ok(query_properties(conn, &owned))))
            .flat_map(|result| match result {
                Ok(rows) => stream::iter(rows),
                Err(e) => stream::iter(vec![Err(e)]),
            })
            .boxed()
    }
}

fn query_kind(conn: &Connection, kind: &str) -> Result<Option<KindStat>> {
    let sql = format!(
        r#"
        SELECT kind_name,
               COALESCE("count", 0),
               COALESCE(entity_bytes, 0),
               COALESCE(builtin_index_bytes, 0),
               COALESCE(builtin_index_count, 0),
               COALESCE(composite_index_bytes, 0),
               COALESCE(composite_index_count, 0),
               epoch_ms("timestamp")
        FROM "{STAT_BY_KIND_TABLE}"
        WHERE kind_name = ?
        LIMIT 1
        "#
    );

    let result = conn.query_row(&sql, params![kind], |row| {
        Ok(KindStat {
            kind: row.get(0)?,
            count: row.get(1)?,
            entity_bytes: row.get(2)?,
            index_bytes: row.get(3)?,
            index_count: row.get(4)?,
            composite_index_bytes: row.get(5)?,
            composite_index_count: row.get(6)?,
            timestamp: millis_to_datetime(row.get(7)?),
        })
    });

    match result {
        Ok(stat) => Ok(Some(stat)),
        Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::stats(format!("Failed to query kind stats: {e}"))),
    }
}

// Ties on the name are broken by type so the first observed entry is stable.
fn query_properties(conn: &Connection, kind: &str) -> Vec<Result<PropertyStat>> {
    let sql = format!(
        r#"
        SELECT kind_name,
               property_name,
               property_type,
               COALESCE("count", 0),
               COALESCE(bytes, 0),
               COALESCE(builtin_index_bytes, 0),
               COALESCE(builtin_index_count, 0),
               epoch_ms("timestamp")
        FROM "{STAT_BY_PROPERTY_TABLE}"
        WHERE kind_name = ?
        ORDER BY property_name, property_type
        "#
    );

    let mut stmt = match conn.prepare(&sql) {
        Ok(stmt) => stmt,
        Err(e) => return vec![Err(Error::property_stats(kind, e.to_string()))],
    };
    let rows = stmt.query_map(params![kind], |row| {
        Ok(PropertyStat {
            kind: row.get(0)?,
            name: row.get(1)?,
            property_type: row.get(2)?,
            count: row.get(3)?,
            bytes: row.get(4)?,
            index_bytes: row.get(5)?,
            index_count: row.get(6)?,
            timestamp: millis_to_datetime(row.get(7)?),
        })
    });

    let stats = match rows {
        Ok(rows) => rows
            .map(|r| r.map_err(|e| Error::property_stats(kind, e.to_string())))
            .collect(),
        Err(e) => vec![Err(Error::property_stats(kind, e.to_string()))],
    };
    stats
}

fn millis_to_datetime(millis: Option<i64>) -> Option<DateTime<Utc>> {
    millis.and_then(DateTime::from_timestamp_millis)
}

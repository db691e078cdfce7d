//! Streaming ingestion of record batches

use super::target::WarehouseTarget;
use super::types::{InsertAllRequest, InsertAllResponse, InsertRow};
use crate::error::{Error, Result};
use crate::http::ClientProvider;
use crate::record::{EntityKey, Normalizer, Record};
use crate::types::JsonValue;
use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

static LAST_INSERT_STAMP: AtomicI64 = AtomicI64::new(0);

/// Nanosecond wall-clock stamp, strictly increasing within the process
pub fn next_insert_stamp() -> i64 {
    let now = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let mut last = LAST_INSERT_STAMP.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_INSERT_STAMP.compare_exchange_weak(
            last,
            next,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

/// Deduplication token of a row: `<encoded key>#<stamp>`
pub fn insert_id(key: &EntityKey, stamp: i64) -> String {
    format!("{}#{}", key.encode(), stamp)
}

/// Sends batches of records to the `insertAll` endpoint
#[derive(Clone)]
pub struct Ingestor {
    provider: Arc<dyn ClientProvider>,
    target: WarehouseTarget,
    normalizer: Normalizer,
}

impl Ingestor {
    /// Create an ingestor that excludes nothing
    pub fn new(provider: Arc<dyn ClientProvider>, target: WarehouseTarget) -> Self {
        Self {
            provider,
            target,
            normalizer: Normalizer::default(),
        }
    }

    /// Replace the exclusion pattern
    #[must_use]
    pub fn with_exclude(mut self, pattern: &str) -> Self {
        self.normalizer = Normalizer::new(pattern);
        self
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn target(&self) -> &WarehouseTarget {
        &self.target
    }

    /// Normalize every record and assign insert ids
    pub fn build_request(&self, records: &[Record]) -> InsertAllRequest {
        let rows = records
            .iter()
            .map(|record| InsertRow {
                insert_id: insert_id(&record.key, next_insert_stamp()),
                json: self.normalizer.normalize(record),
            })
            .collect();
        InsertAllRequest::new(rows)
    }

    /// Stream a batch into the table named after the first record's kind.
    ///
    /// An empty batch succeeds without contacting the warehouse. Rows
    /// rejected by the service come back as one [`Error::InsertErrors`].
    pub async fn ingest(&self, records: &[Record]) -> Result<()> {
        let Some(first) = records.first() else {
            info!("Ignoring ingestion of 0 records");
            return Ok(());
        };
        let kind = first.kind();

        let request = self.build_request(records);
        if tracing::enabled!(tracing::Level::DEBUG) {
            let payload = serde_json::to_string(&request)?;
            debug!("Payload: {}", payload);
        }

        let client = self.provider.client().map_err(|e| {
            error!("Error initializing client: {}", e);
            e
        })?;
        let url = self.target.insert_all_url(kind)?;

        let response = client.post(&url, &request).await.map_err(|e| {
            error!("Request error for {} records: {}", records.len(), e);
            e
        })?;
        let body = response.text().await.map_err(Error::Http)?;

        InsertAllResponse::from_body(&body)?.into_result().map_err(|e| {
            error!("Rows rejected while ingesting {}: {}", kind, e);
            e
        })?;

        info!("Ingested {} records into {}", records.len(), kind);
        Ok(())
    }

    /// Decode records from their JSON export form, then ingest them.
    ///
    /// The first undecodable record aborts the batch before anything is sent.
    pub async fn ingest_json(&self, raw: Vec<JsonValue>) -> Result<()> {
        let records = raw
            .into_iter()
            .map(Record::from_json)
            .collect::<Result<Vec<_>>>()?;
        self.ingest(&records).await
    }
}

impl std::fmt::Debug for Ingestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingestor")
            .field("target", &self.target)
            .field("exclude", &self.normalizer.pattern())
            .finish_non_exhaustive()
    }
}

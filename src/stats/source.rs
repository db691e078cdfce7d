//! Statistics query interface

use super::types::{KindStat, PropertyStat};
use crate::error::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Stream of property statistics, ordered by property name.
///
/// The end of the stream means "no more results"; an `Err` item is a real
/// failure of the underlying query.
pub type PropertyStatStream<'a> = BoxStream<'a, Result<PropertyStat>>;

/// Read-only access to the store's aggregate statistics
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Fetch the kind-level statistics, `None` when the kind has none
    async fn kind_stat(&self, kind: &str) -> Result<Option<KindStat>>;

    /// Stream the property-level statistics of a kind, ordered by property name
    fn property_stats<'a>(&'a self, kind: &'a str) -> PropertyStatStream<'a>;
}

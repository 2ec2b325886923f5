//! Record source contract
//!
//! The minimal query interface the paginators need from the store that owns the records.

use async_trait::async_trait;
use std::collections::HashMap;

use super::{QuerySignature, RecordId};
use shared::error::AppResult;
use shared::models::Order;

/// A record addressable by an opaque integer identifier
pub trait Identified {
    fn record_id(&self) -> RecordId;
}

impl Identified for Order {
    fn record_id(&self) -> RecordId {
        self.id
    }
}

#[async_trait]
pub trait RecordSource: Send + Sync {
    type Record: Identified + Send;

    /// Number of records matching the signature
    async fn count(&self, query: &QuerySignature) -> AppResult<u64>;

    /// Identifiers of every matching record, in the signature's ordering
    async fn fetch_all_identifiers(&self, query: &QuerySignature) -> AppResult<Vec<RecordId>>;

    /// Matching records whose identifier is in `ids`; result order is unspecified
    async fn fetch_by_identifiers(
        &self,
        query: &QuerySignature,
        ids: &[RecordId],
    ) -> AppResult<Vec<Self::Record>>;
}

/// Put `records` back into the order of `ids`, dropping identifiers with no record
pub fn reorder<R: Identified>(ids: &[RecordId], records: Vec<R>) -> Vec<R> {
    let mut by_id: HashMap<RecordId, R> = records
        .into_iter()
        .map(|record| (record.record_id(), record))
        .collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

//! Get-or-compute layer over the snapshot cache
//!
//! A miss always resolves to "compute now": concurrent requests for the same missing snapshot
//! each recompute it independently.

use std::sync::Arc;
use std::time::Duration;

use super::{CacheKeys, QuerySignature, RecordId, RecordSource, SnapshotCache};
use shared::error::AppResult;

/// Snapshots of one cache namespace
#[derive(Clone)]
pub struct SnapshotStore {
    cache: Arc<dyn SnapshotCache>,
    prefix: String,
    ttl: Duration,
}

impl SnapshotStore {
    pub fn new(cache: Arc<dyn SnapshotCache>, prefix: impl Into<String>, ttl: Duration) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
            ttl,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn keys(&self, query: &QuerySignature) -> CacheKeys {
        CacheKeys::new(&self.prefix, query)
    }

    /// Identifier snapshot, captured from `source` on miss
    pub async fn identifiers<S>(
        &self,
        source: &S,
        query: &QuerySignature,
    ) -> AppResult<Arc<[RecordId]>>
    where
        S: RecordSource + ?Sized,
    {
        let key = self.keys(query).identifiers;
        if let Some(ids) = self.cache.get_identifiers(&key).await? {
            return Ok(ids);
        }

        let ids: Arc<[RecordId]> = source.fetch_all_identifiers(query).await?.into();
        tracing::debug!(key = %key, query = %query, count = ids.len(), "Captured identifier snapshot");
        self.cache
            .set_identifiers(&key, ids.clone(), self.ttl)
            .await?;
        Ok(ids)
    }

    /// Count snapshot, counted by `source` on miss
    pub async fn count<S>(&self, source: &S, query: &QuerySignature) -> AppResult<u64>
    where
        S: RecordSource + ?Sized,
    {
        let key = self.keys(query).count;
        if let Some(count) = self.cache.get_count(&key).await? {
            return Ok(count);
        }

        let count = source.count(query).await?;
        tracing::debug!(key = %key, query = %query, count, "Captured count snapshot");
        self.cache.set_count(&key, count, self.ttl).await?;
        Ok(count)
    }

    /// Drop both snapshots of `query`
    pub async fn invalidate(&self, query: &QuerySignature) -> AppResult<()> {
        let keys = self.keys(query);
        self.cache.invalidate(&keys.identifiers).await?;
        self.cache.invalidate(&keys.count).await?;
        Ok(())
    }
}

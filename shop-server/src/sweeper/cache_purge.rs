//! 快照缓存清理（维护任务）

use async_trait::async_trait;
use std::sync::Arc;

use super::{SweepReport, SweepTask};
use crate::pagination::MemoryCache;
use shared::error::AppResult;

pub struct CachePurge {
    cache: Arc<MemoryCache>,
}

impl CachePurge {
    pub fn new(cache: Arc<MemoryCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl SweepTask for CachePurge {
    fn name(&self) -> &'static str {
        "cache_purge"
    }

    async fn run_cycle(&self) -> AppResult<SweepReport> {
        let purged = self.cache.purge_expired();
        if purged > 0 {
            tracing::debug!(purged, remaining = self.cache.len(), "Purged expired cache entries");
        }
        Ok(SweepReport {
            matched: purged,
            notified: 0,
            updated: purged as u64,
        })
    }
}

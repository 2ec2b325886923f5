//! 标识符缓存
//!
//! 按查询签名缓存标识符快照与计数快照。缓存是尽力而为的：任何缺失都由调用方重新计算并回填。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::RecordId;
use crate::utils::Clock;
use shared::error::{AppError, AppResult};

/// 快照缓存
///
/// 所有操作返回 [`AppResult`]，缓存不可达时以 `CacheUnavailable` 失败。
#[async_trait]
pub trait SnapshotCache: Send + Sync {
    async fn get_identifiers(&self, key: &str) -> AppResult<Option<Arc<[RecordId]>>>;

    async fn set_identifiers(
        &self,
        key: &str,
        identifiers: Arc<[RecordId]>,
        ttl: Duration,
    ) -> AppResult<()>;

    async fn get_count(&self, key: &str) -> AppResult<Option<u64>>;

    async fn set_count(&self, key: &str, count: u64, ttl: Duration) -> AppResult<()>;

    /// 删除条目，返回条目是否存在
    async fn invalidate(&self, key: &str) -> AppResult<bool>;
}

#[derive(Debug, Clone)]
enum CachedValue {
    Identifiers(Arc<[RecordId]>),
    Count(u64),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: CachedValue,
    /// None = never expires (TTL overflowed the calendar)
    expires_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// 进程内缓存
///
/// 过期时间由注入的 [`Clock`] 计算；过期条目读取时视为缺失并惰性删除，
/// [`MemoryCache::purge_expired`] 批量清理。
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
    clock: Arc<dyn Clock>,
    available: AtomicBool,
}

impl MemoryCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
            available: AtomicBool::new(true),
        }
    }

    /// 模拟缓存不可达
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 清理所有过期条目，返回清理数量
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    fn ensure_available(&self) -> AppResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::cache_unavailable("Snapshot cache is unreachable"))
        }
    }

    fn read(&self, key: &str) -> Option<CachedValue> {
        let now = self.clock.now();
        let value = {
            let entry = self.entries.get(key)?;
            if entry.is_expired(now) {
                None
            } else {
                Some(entry.value.clone())
            }
        };
        if value.is_none() {
            self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        }
        value
    }

    fn write(&self, key: &str, value: CachedValue, ttl: Duration) {
        if ttl.is_zero() {
            self.entries.remove(key);
            return;
        }
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| self.clock.now().checked_add_signed(ttl));
        self.entries
            .insert(key.to_string(), CacheEntry { value, expires_at });
    }
}

#[async_trait]
impl SnapshotCache for MemoryCache {
    async fn get_identifiers(&self, key: &str) -> AppResult<Option<Arc<[RecordId]>>> {
        self.ensure_available()?;
        Ok(match self.read(key) {
            Some(CachedValue::Identifiers(ids)) => Some(ids),
            _ => None,
        })
    }

    async fn set_identifiers(
        &self,
        key: &str,
        identifiers: Arc<[RecordId]>,
        ttl: Duration,
    ) -> AppResult<()> {
        self.ensure_available()?;
        self.write(key, CachedValue::Identifiers(identifiers), ttl);
        Ok(())
    }

    async fn get_count(&self, key: &str) -> AppResult<Option<u64>> {
        self.ensure_available()?;
        Ok(match self.read(key) {
            Some(CachedValue::Count(count)) => Some(count),
            _ => None,
        })
    }

    async fn set_count(&self, key: &str, count: u64, ttl: Duration) -> AppResult<()> {
        self.ensure_available()?;
        self.write(key, CachedValue::Count(count), ttl);
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> AppResult<bool> {
        self.ensure_available()?;
        Ok(self.entries.remove(key).is_some())
    }
}

//! 快照分页引擎
//!
//! - [`QuerySignature`] 描述结果集（资源 + 过滤 + 排序），派生缓存键
//! - [`SnapshotCache`] 存放标识符快照与计数快照
//! - [`SnapshotPaginator`] 页码分页，[`LimitOffsetPaginator`] 偏移分页
//!
//! 全量扫描只发生在快照缺失时，每个签名每个 TTL 窗口至多一次。

pub mod cache;
pub mod limit_offset;
pub mod page_number;
pub mod signature;
pub mod snapshot;
pub mod source;

/// 记录标识符
pub type RecordId = i64;

pub use cache::{MemoryCache, SnapshotCache};
pub use limit_offset::{LimitOffsetPaginator, Window};
pub use page_number::{Page, PageNumber, PageRequest, SnapshotPaginator, UNCOUNTED_TOTAL};
pub use signature::{CacheKeys, QuerySignature};
pub use snapshot::SnapshotStore;
pub use source::{Identified, RecordSource, reorder};

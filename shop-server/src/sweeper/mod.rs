//! 订单生命周期清扫
//!
//! - [`UnpaidOrderNotifier`] - 付款期限为明天的未付款订单发送提醒
//! - [`ExpireUnpaidOrders`] - 已过付款期限的未付款订单发送通知并批量置为 `expired`
//! - [`CachePurge`] - 清理过期的快照缓存条目
//!
//! 每个任务由一个 [`TaskCollector`] 驱动：独立的 tokio 任务，周期执行，互不重叠。

pub mod cache_purge;
pub mod collector;
pub mod expire_unpaid;
pub mod notify_unpaid;

use async_trait::async_trait;
use std::fmt;

use shared::error::AppResult;

pub use cache_purge::CachePurge;
pub use collector::TaskCollector;
pub use expire_unpaid::ExpireUnpaidOrders;
pub use notify_unpaid::UnpaidOrderNotifier;

/// 单次清扫结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// 命中的记录数
    pub matched: usize,
    /// 已接受的通知数
    pub notified: usize,
    /// 写入的记录数
    pub updated: u64,
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "matched={} notified={} updated={}",
            self.matched, self.notified, self.updated
        )
    }
}

/// 一种清扫任务的单次执行逻辑
#[async_trait]
pub trait SweepTask: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run_cycle(&self) -> AppResult<SweepReport>;
}

//! 订单存储
//!
//! [`OrderStore`] 是后台清扫任务所需的最小订单查询/写入接口；
//! 分页读取通过 [`crate::pagination::RecordSource`] 完成。

pub mod memory;
pub mod seed;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::utils::CalendarDay;
use shared::error::AppResult;
use shared::models::{Order, OrderStatus};

pub use memory::{MemoryOrderStore, QueryStats};
pub use seed::seed_orders;

/// 订单列表资源名（查询签名）
pub const ORDERS_RESOURCE: &str = "orders";

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// 未付款且付款期限落在 `day` 内的订单
    async fn fetch_unpaid_orders_due_on(&self, day: &CalendarDay) -> AppResult<Vec<Order>>;

    /// 未付款且付款期限早于 `deadline` 的订单
    async fn fetch_unpaid_orders_past(&self, deadline: DateTime<Utc>) -> AppResult<Vec<Order>>;

    /// 批量更新状态（单次写入），返回实际写入的订单数
    ///
    /// 写入时重新检查选择条件：只有仍未付款、尚未处于 `status` 且付款期限早于 `deadline`
    /// 的订单会被修改。读取与写入之间已付款的订单保持不变。
    async fn bulk_update_status(
        &self,
        ids: &[i64],
        status: OrderStatus,
        deadline: DateTime<Utc>,
    ) -> AppResult<u64>;
}

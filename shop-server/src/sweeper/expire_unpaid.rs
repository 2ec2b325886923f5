//! 未付款订单过期
//!
//! 付款期限已过（严格早于当前时间）的未付款订单：先尽力发送过期通知，再一次性批量写入
//! `expired` 状态。已是 `expired` 的订单不再处理，重复清扫不会产生额外写入。
//!
//! 批量写入时存储会重新检查“未付款且已过期限”，发送通知期间完成付款的订单不会被置为过期。

use async_trait::async_trait;
use std::sync::Arc;

use super::{SweepReport, SweepTask};
use crate::notify::{Notification, Notifier, send_mass_silently};
use crate::store::OrderStore;
use crate::utils::Clock;
use shared::error::AppResult;
use shared::models::{Order, OrderStatus};

pub struct ExpireUnpaidOrders {
    store: Arc<dyn OrderStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    from: String,
}

impl ExpireUnpaidOrders {
    pub fn new(
        store: Arc<dyn OrderStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            from: from.into(),
        }
    }
}

#[async_trait]
impl SweepTask for ExpireUnpaidOrders {
    fn name(&self) -> &'static str {
        "expire_unpaid_orders"
    }

    async fn run_cycle(&self) -> AppResult<SweepReport> {
        let now = self.clock.now();
        let overdue: Vec<Order> = self
            .store
            .fetch_unpaid_orders_past(now)
            .await?
            .into_iter()
            .filter(|order| order.status != OrderStatus::Expired)
            .collect();
        if overdue.is_empty() {
            tracing::debug!("No overdue unpaid orders");
            return Ok(SweepReport::default());
        }

        let messages: Vec<Notification> = overdue
            .iter()
            .filter_map(|order| Notification::order_expired(&self.from, order))
            .collect();
        let notified = send_mass_silently(self.notifier.as_ref(), &messages).await;

        let ids: Vec<i64> = overdue.iter().map(|order| order.id).collect();
        let updated = self
            .store
            .bulk_update_status(&ids, OrderStatus::Expired, now)
            .await?;

        tracing::info!(
            matched = overdue.len(),
            notified,
            updated,
            "Expired overdue unpaid orders"
        );
        Ok(SweepReport {
            matched: overdue.len(),
            notified,
            updated,
        })
    }
}

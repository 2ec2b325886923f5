//! 付款期限提醒
//!
//! 付款期限落在“明天”（当前时间 + 24h 所在的业务时区日历日）的未付款订单，各发送一条提醒。
//! 不修改订单状态。

use async_trait::async_trait;
use chrono::Duration;
use chrono_tz::Tz;
use std::sync::Arc;

use super::{SweepReport, SweepTask};
use crate::notify::{Notification, Notifier, send_mass_silently};
use crate::store::OrderStore;
use crate::utils::{Clock, calendar_day};
use shared::error::AppResult;

pub struct UnpaidOrderNotifier {
    store: Arc<dyn OrderStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    tz: Tz,
    from: String,
}

impl UnpaidOrderNotifier {
    pub fn new(
        store: Arc<dyn OrderStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        tz: Tz,
        from: impl Into<String>,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            tz,
            from: from.into(),
        }
    }
}

#[async_trait]
impl SweepTask for UnpaidOrderNotifier {
    fn name(&self) -> &'static str {
        "unpaid_order_notifier"
    }

    async fn run_cycle(&self) -> AppResult<SweepReport> {
        let tomorrow = calendar_day(self.clock.now() + Duration::hours(24), self.tz);
        let orders = self.store.fetch_unpaid_orders_due_on(&tomorrow).await?;
        if orders.is_empty() {
            tracing::debug!(date = %tomorrow.date, "No unpaid orders due tomorrow");
            return Ok(SweepReport::default());
        }

        let messages: Vec<Notification> = orders
            .iter()
            .filter_map(|order| Notification::unpaid_reminder(&self.from, order))
            .collect();
        let notified = send_mass_silently(self.notifier.as_ref(), &messages).await;

        tracing::info!(
            date = %tomorrow.date,
            matched = orders.len(),
            notified,
            "Reminded clients of orders due tomorrow"
        );
        Ok(SweepReport {
            matched: orders.len(),
            notified,
            updated: 0,
        })
    }
}

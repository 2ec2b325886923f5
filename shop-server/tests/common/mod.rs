//! Shared helpers for the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use shared::models::{Order, OrderStatus};
use shop_server::Config;
use shop_server::notify::{Notification, Notifier, NotifyError};
use shop_server::store::MemoryOrderStore;
use shop_server::utils::ManualClock;

/// 2024-05-01 12:00:00 UTC
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(t0()))
}

/// Defaults only; nothing read from the process environment
pub fn test_config() -> Config {
    Config::from_lookup(|_| None)
}

pub fn order(id: i64, status: OrderStatus, deadline: DateTime<Utc>) -> Order {
    Order {
        id,
        client_id: Some(id % 5 + 1),
        client_email: Some(format!("client{}@example.com", id)),
        order_date: deadline - Duration::days(5),
        payment_deadline: deadline,
        full_price: Some(Decimal::new(id * 1000 + 99, 2)),
        discount: Decimal::ZERO,
        is_paid: !status.is_unpaid(),
        status,
    }
}

/// Store holding orders `1..=n`, all paid and far from any deadline
pub fn store_with(n: i64) -> Arc<MemoryOrderStore> {
    let store = Arc::new(MemoryOrderStore::new());
    for id in 1..=n {
        store.insert(order(id, OrderStatus::Completed, t0() + Duration::days(30)));
    }
    store
}

/// Notifier that keeps every accepted message
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_mass(&self, messages: &[Notification]) -> Result<usize, NotifyError> {
        self.sent.lock().extend_from_slice(messages);
        Ok(messages.len())
    }
}

/// Notifier whose transport is always down
#[derive(Default)]
pub struct FailingNotifier {
    attempts: AtomicUsize,
}

impl FailingNotifier {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send_mass(&self, _messages: &[Notification]) -> Result<usize, NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(NotifyError::Transport("connection refused".to_string()))
    }
}

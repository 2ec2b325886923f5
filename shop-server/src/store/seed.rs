//! 测试数据填充
//!
//! 生成随机订单填入内存存储（`SEED_ORDERS`）。

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;

use super::MemoryOrderStore;
use shared::models::{Order, OrderStatus};

/// 用线程随机数生成器填充 `count` 个订单
pub fn seed_orders(
    store: &MemoryOrderStore,
    count: usize,
    now: DateTime<Utc>,
    deadline_days: i64,
) -> usize {
    let mut rng = rand::thread_rng();
    seed_orders_with(&mut rng, store, count, now, deadline_days)
}

/// 用指定随机数生成器填充 `count` 个订单
pub fn seed_orders_with<R: Rng>(
    rng: &mut R,
    store: &MemoryOrderStore,
    count: usize,
    now: DateTime<Utc>,
    deadline_days: i64,
) -> usize {
    for _ in 0..count {
        let client_id = rng.gen_range(1..=50_i64);
        // Spread order dates over the last two weeks so some deadlines have passed
        let order_date = now - Duration::minutes(rng.gen_range(0..14 * 24 * 60));
        let status = OrderStatus::ALL[rng.gen_range(0..OrderStatus::ALL.len())];
        let discount = if rng.gen_bool(0.2) {
            Decimal::new(rng.gen_range(5..=30), 2)
        } else {
            Decimal::ZERO
        };

        store.insert(Order {
            id: 0,
            client_id: Some(client_id),
            client_email: Some(format!("client{}@example.com", client_id)),
            order_date,
            payment_deadline: Order::default_payment_deadline(order_date, deadline_days),
            full_price: Some(Decimal::new(rng.gen_range(500..=500_000), 2)),
            discount,
            is_paid: !status.is_unpaid(),
            status,
        });
    }

    tracing::info!(count, "Seeded fake orders");
    count
}

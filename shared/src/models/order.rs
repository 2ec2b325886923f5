//! Order Model
//!
//! Only the fields the pagination engine and the lifecycle sweeper rely on. Everything else an
//! order carries (line items, address, coupons) belongs to the store that owns it.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order status
///
/// Numeric codes are stable and match the stored representation:
///
/// | code | status | 说明 |
/// |------|--------|------|
/// | 0 | pending | 已开始结账，未付款 |
/// | 1 | pending_payment | 已发起支付，未到账 |
/// | 2 | payment_received | 已收款 |
/// | 3 | order_confirmed | 已确认 |
/// | 4 | failed | 支付或校验失败 |
/// | 5 | expired | 超过付款期限未付款 |
/// | 6..=11 | fulfillment / shipping states | 履约与配送 |
/// | 12 | completed | 已完成（付款路径终态） |
/// | 13..=18 | canceled / declined / refund / dispute states | 取消、退款、争议 |
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    PendingPayment,
    PaymentReceived,
    OrderConfirmed,
    Failed,
    Expired,
    AwaitingFulfillment,
    AwaitingShipment,
    OnHold,
    Shipped,
    PartiallyShipped,
    AwaitingPickup,
    Completed,
    Canceled,
    Declined,
    Refunded,
    PartiallyRefunded,
    RefundRejected,
    Disputed,
}

impl OrderStatus {
    /// 未付款状态集合
    pub const UNPAID: [OrderStatus; 3] = [
        OrderStatus::Pending,
        OrderStatus::PendingPayment,
        OrderStatus::Expired,
    ];

    /// All statuses, ordered by code
    pub const ALL: [OrderStatus; 19] = [
        OrderStatus::Pending,
        OrderStatus::PendingPayment,
        OrderStatus::PaymentReceived,
        OrderStatus::OrderConfirmed,
        OrderStatus::Failed,
        OrderStatus::Expired,
        OrderStatus::AwaitingFulfillment,
        OrderStatus::AwaitingShipment,
        OrderStatus::OnHold,
        OrderStatus::Shipped,
        OrderStatus::PartiallyShipped,
        OrderStatus::AwaitingPickup,
        OrderStatus::Completed,
        OrderStatus::Canceled,
        OrderStatus::Declined,
        OrderStatus::Refunded,
        OrderStatus::PartiallyRefunded,
        OrderStatus::RefundRejected,
        OrderStatus::Disputed,
    ];

    /// Stored numeric code
    pub const fn code(&self) -> u8 {
        *self as u8
    }

    /// Look up a status by its numeric code
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn is_unpaid(&self) -> bool {
        Self::UNPAID.contains(self)
    }

    /// Wire name (snake_case)
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PendingPayment => "pending_payment",
            Self::PaymentReceived => "payment_received",
            Self::OrderConfirmed => "order_confirmed",
            Self::Failed => "failed",
            Self::Expired => "expired",
            Self::AwaitingFulfillment => "awaiting_fulfillment",
            Self::AwaitingShipment => "awaiting_shipment",
            Self::OnHold => "on_hold",
            Self::Shipped => "shipped",
            Self::PartiallyShipped => "partially_shipped",
            Self::AwaitingPickup => "awaiting_pickup",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
            Self::Declined => "declined",
            Self::Refunded => "refunded",
            Self::PartiallyRefunded => "partially_refunded",
            Self::RefundRejected => "refund_rejected",
            Self::Disputed => "disputed",
        }
    }

    /// Human readable label
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::PendingPayment => "Pending Payment",
            Self::PaymentReceived => "Payment Received",
            Self::OrderConfirmed => "Order Confirmed",
            Self::Failed => "Failed",
            Self::Expired => "Expired",
            Self::AwaitingFulfillment => "Awaiting Fulfillment",
            Self::AwaitingShipment => "Awaiting Shipment",
            Self::OnHold => "On Hold",
            Self::Shipped => "Shipped",
            Self::PartiallyShipped => "Partially Shipped",
            Self::AwaitingPickup => "Awaiting Pickup",
            Self::Completed => "Completed",
            Self::Canceled => "Canceled",
            Self::Declined => "Declined",
            Self::Refunded => "Refunded",
            Self::PartiallyRefunded => "Partially Refunded",
            Self::RefundRejected => "Refund Rejected",
            Self::Disputed => "Disputed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown status name or code
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0}")]
pub struct UnknownOrderStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownOrderStatus;

    /// Accepts either the wire name (`pending_payment`) or the numeric code (`1`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u8>() {
            return Self::from_code(code).ok_or_else(|| UnknownOrderStatus(s.to_string()));
        }
        Self::ALL
            .iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| UnknownOrderStatus(s.to_string()))
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: i64,
    pub client_id: Option<i64>,
    /// Notification address of the client (None when the client account is gone)
    pub client_email: Option<String>,
    pub order_date: DateTime<Utc>,
    pub payment_deadline: DateTime<Utc>,
    /// Sum of line prices; None until computed
    pub full_price: Option<Decimal>,
    /// Fraction in [0, 1), e.g. 0.20 for 20%
    pub discount: Decimal,
    pub is_paid: bool,
    pub status: OrderStatus,
}

impl Order {
    /// Deadline derived from the order date when none was supplied
    pub fn default_payment_deadline(order_date: DateTime<Utc>, days: i64) -> DateTime<Utc> {
        order_date + Duration::days(days)
    }

    pub fn has_discount(&self) -> bool {
        self.discount > Decimal::ZERO
    }

    /// Final price with discount applied, e.g. 80% of the full price for a 0.20 discount
    pub fn final_price(&self) -> Option<Decimal> {
        let full = self.full_price?;
        if self.has_discount() {
            Some((full * (Decimal::ONE - self.discount)).round_dp(2))
        } else {
            Some(full)
        }
    }

    pub fn status_name(&self) -> &'static str {
        self.status.label()
    }

    pub fn is_unpaid(&self) -> bool {
        self.status.is_unpaid()
    }
}

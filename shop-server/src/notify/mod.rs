//! 通知
//!
//! 通知投递是尽力而为的：[`send_mass_silently`] 吞掉 [`NotifyError`] 并记录 warn 日志，
//! 投递失败从不阻止订单状态写入。

use async_trait::async_trait;
use thiserror::Error;

use shared::models::Order;

pub const UNPAID_REMINDER_SUBJECT: &str = "Unpaid order!";
pub const ORDER_EXPIRED_SUBJECT: &str = "Order expired!";
pub const ORDER_EXPIRED_BODY: &str =
    "Your order has expired because you have not paid in full for your order";

/// 一条邮件通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
    pub from: String,
    pub to: Vec<String>,
}

impl Notification {
    /// 付款期限前一天提醒；订单无联系地址时返回 None
    pub fn unpaid_reminder(from: &str, order: &Order) -> Option<Self> {
        let to = order.client_email.clone()?;
        Some(Self {
            subject: UNPAID_REMINDER_SUBJECT.to_string(),
            body: format!(
                "You have one day left to pay for your order worth {}",
                order.full_price.unwrap_or_default()
            ),
            from: from.to_string(),
            to: vec![to],
        })
    }

    /// 订单过期通知；订单无联系地址时返回 None
    pub fn order_expired(from: &str, order: &Order) -> Option<Self> {
        let to = order.client_email.clone()?;
        Some(Self {
            subject: ORDER_EXPIRED_SUBJECT.to_string(),
            body: ORDER_EXPIRED_BODY.to_string(),
            from: from.to_string(),
            to: vec![to],
        })
    }
}

/// 通知错误
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Mail transport unavailable: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// 批量发送，返回已接受的消息数
    async fn send_mass(&self, messages: &[Notification]) -> Result<usize, NotifyError>;
}

/// 控制台邮件后端：每条消息写入 `mail` 日志目标
///
/// 收件地址无效的消息被跳过，不影响同批次的其他消息。
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send_mass(&self, messages: &[Notification]) -> Result<usize, NotifyError> {
        let mut accepted = 0;
        for message in messages {
            if let Some(bad) = message.to.iter().find(|to| !to.contains('@')) {
                tracing::warn!(
                    target: "mail",
                    to = %bad,
                    subject = %message.subject,
                    "Skipped mail with invalid recipient"
                );
                continue;
            }
            tracing::info!(
                target: "mail",
                from = %message.from,
                to = %message.to.join(", "),
                subject = %message.subject,
                body = %message.body,
                "Mail sent"
            );
            accepted += 1;
        }
        Ok(accepted)
    }
}

/// 尽力发送：失败只记录日志，返回已接受的消息数
pub async fn send_mass_silently(notifier: &dyn Notifier, messages: &[Notification]) -> usize {
    if messages.is_empty() {
        return 0;
    }
    match notifier.send_mass(messages).await {
        Ok(sent) => sent,
        Err(e) => {
            tracing::warn!(error = %e, messages = messages.len(), "Notification delivery failed");
            0
        }
    }
}

//! 内存订单存储
//!
//! 同时实现 [`OrderStore`] 与 `RecordSource<Record = Order>`。记录查询次数供测试校验
//! “每个 TTL 窗口至多一次全量扫描” 与 “每次清扫一次批量写入”，并可切换为不可用状态。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::cmp::Ordering as CmpOrdering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

use super::{ORDERS_RESOURCE, OrderStore};
use crate::pagination::{QuerySignature, RecordId, RecordSource};
use crate::utils::CalendarDay;
use shared::error::{AppError, AppResult};
use shared::models::{Order, OrderStatus};

/// 查询统计
#[derive(Debug, Default)]
struct Counters {
    count_queries: AtomicU64,
    identifier_scans: AtomicU64,
    page_fetches: AtomicU64,
    /// 按标识符读取的行数
    rows_read: AtomicU64,
    bulk_updates: AtomicU64,
}

/// 查询统计快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryStats {
    pub count_queries: u64,
    pub identifier_scans: u64,
    pub page_fetches: u64,
    pub rows_read: u64,
    pub bulk_updates: u64,
}

/// Parsed order list filter
#[derive(Debug, Default)]
struct OrderFilter {
    status: Option<OrderStatus>,
    client_id: Option<i64>,
    is_paid: Option<bool>,
}

impl OrderFilter {
    fn matches(&self, order: &Order) -> bool {
        self.status.is_none_or(|s| order.status == s)
            && self.client_id.is_none_or(|c| order.client_id == Some(c))
            && self.is_paid.is_none_or(|p| order.is_paid == p)
    }
}

#[derive(Debug, Clone, Copy)]
enum SortField {
    Id,
    OrderDate,
    PaymentDeadline,
    FullPrice,
}

#[derive(Debug, Clone, Copy)]
struct SortKey {
    field: SortField,
    descending: bool,
}

impl SortKey {
    fn parse(raw: &str) -> AppResult<Self> {
        let (descending, name) = match raw.strip_prefix('-') {
            Some(name) => (true, name),
            None => (false, raw),
        };
        let field = match name {
            "id" => SortField::Id,
            "order_date" => SortField::OrderDate,
            "payment_deadline" => SortField::PaymentDeadline,
            "full_price" => SortField::FullPrice,
            other => {
                return Err(AppError::validation(format!(
                    "Unknown ordering field: {}",
                    other
                )));
            }
        };
        Ok(Self { field, descending })
    }

    fn compare(&self, a: &Order, b: &Order) -> CmpOrdering {
        let ord = match self.field {
            SortField::Id => a.id.cmp(&b.id),
            SortField::OrderDate => a.order_date.cmp(&b.order_date),
            SortField::PaymentDeadline => a.payment_deadline.cmp(&b.payment_deadline),
            SortField::FullPrice => a.full_price.cmp(&b.full_price),
        };
        if self.descending { ord.reverse() } else { ord }
    }
}

/// Validated form of a query signature against the order list
struct OrderQuery {
    filter: OrderFilter,
    sort: Vec<SortKey>,
}

impl OrderQuery {
    fn parse(query: &QuerySignature) -> AppResult<Self> {
        if query.resource() != ORDERS_RESOURCE {
            return Err(AppError::validation(format!(
                "Unknown resource: {}",
                query.resource()
            )));
        }

        let mut filter = OrderFilter::default();
        for (field, value) in query.filters() {
            match field.as_str() {
                "status" => {
                    let status = value
                        .parse::<OrderStatus>()
                        .map_err(|e| AppError::validation(e.to_string()))?;
                    filter.status = Some(status);
                }
                "client_id" => {
                    let id = value.parse::<i64>().map_err(|_| {
                        AppError::validation(format!("Invalid client_id: {}", value))
                    })?;
                    filter.client_id = Some(id);
                }
                "is_paid" => {
                    let paid = match value.to_ascii_lowercase().as_str() {
                        "true" | "1" => true,
                        "false" | "0" => false,
                        _ => {
                            return Err(AppError::validation(format!(
                                "Invalid is_paid: {}",
                                value
                            )));
                        }
                    };
                    filter.is_paid = Some(paid);
                }
                other => {
                    return Err(AppError::validation(format!("Unknown filter: {}", other)));
                }
            }
        }

        let mut sort = query
            .ordering()
            .iter()
            .map(|f| SortKey::parse(f))
            .collect::<AppResult<Vec<_>>>()?;
        if sort.is_empty() {
            sort.push(SortKey {
                field: SortField::Id,
                descending: true,
            });
        }

        Ok(Self { filter, sort })
    }

    fn compare(&self, a: &Order, b: &Order) -> CmpOrdering {
        self.sort
            .iter()
            .map(|key| key.compare(a, b))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| a.id.cmp(&b.id))
    }
}

/// 内存订单存储
#[derive(Debug)]
pub struct MemoryOrderStore {
    orders: RwLock<BTreeMap<i64, Order>>,
    next_id: AtomicI64,
    counters: Counters,
    available: AtomicBool,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
            counters: Counters::default(),
            available: AtomicBool::new(true),
        }
    }

    /// 插入订单；`id <= 0` 时分配新 ID
    pub fn insert(&self, mut order: Order) -> Order {
        if order.id <= 0 {
            order.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        } else {
            self.next_id.fetch_max(order.id + 1, Ordering::SeqCst);
        }
        self.orders.write().insert(order.id, order.clone());
        order
    }

    pub fn get(&self, id: i64) -> Option<Order> {
        self.orders.read().get(&id).cloned()
    }

    pub fn remove(&self, id: i64) -> Option<Order> {
        self.orders.write().remove(&id)
    }

    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }

    /// 模拟存储不可达
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn stats(&self) -> QueryStats {
        QueryStats {
            count_queries: self.counters.count_queries.load(Ordering::SeqCst),
            identifier_scans: self.counters.identifier_scans.load(Ordering::SeqCst),
            page_fetches: self.counters.page_fetches.load(Ordering::SeqCst),
            rows_read: self.counters.rows_read.load(Ordering::SeqCst),
            bulk_updates: self.counters.bulk_updates.load(Ordering::SeqCst),
        }
    }

    fn ensure_available(&self) -> AppResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::store_unavailable("Order store is unreachable"))
        }
    }

    fn select_unpaid(&self, pred: impl Fn(&Order) -> bool) -> Vec<Order> {
        self.orders
            .read()
            .values()
            .filter(|o| o.is_unpaid() && pred(o))
            .cloned()
            .collect()
    }
}

impl Default for MemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordSource for MemoryOrderStore {
    type Record = Order;

    async fn count(&self, query: &QuerySignature) -> AppResult<u64> {
        self.ensure_available()?;
        let parsed = OrderQuery::parse(query)?;
        self.counters.count_queries.fetch_add(1, Ordering::SeqCst);
        let count = self
            .orders
            .read()
            .values()
            .filter(|o| parsed.filter.matches(o))
            .count();
        Ok(count as u64)
    }

    async fn fetch_all_identifiers(&self, query: &QuerySignature) -> AppResult<Vec<RecordId>> {
        self.ensure_available()?;
        let parsed = OrderQuery::parse(query)?;
        self.counters.identifier_scans.fetch_add(1, Ordering::SeqCst);
        let orders = self.orders.read();
        let mut matched: Vec<&Order> = orders
            .values()
            .filter(|o| parsed.filter.matches(o))
            .collect();
        matched.sort_by(|a, b| parsed.compare(a, b));
        Ok(matched.into_iter().map(|o| o.id).collect())
    }

    async fn fetch_by_identifiers(
        &self,
        query: &QuerySignature,
        ids: &[RecordId],
    ) -> AppResult<Vec<Order>> {
        self.ensure_available()?;
        let parsed = OrderQuery::parse(query)?;
        self.counters.page_fetches.fetch_add(1, Ordering::SeqCst);
        let wanted: BTreeSet<RecordId> = ids.iter().copied().collect();
        self.counters
            .rows_read
            .fetch_add(wanted.len() as u64, Ordering::SeqCst);
        let orders = self.orders.read();
        Ok(wanted
            .iter()
            .filter_map(|id| orders.get(id))
            .filter(|o| parsed.filter.matches(o))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn fetch_unpaid_orders_due_on(&self, day: &CalendarDay) -> AppResult<Vec<Order>> {
        self.ensure_available()?;
        Ok(self.select_unpaid(|o| day.contains(o.payment_deadline)))
    }

    async fn fetch_unpaid_orders_past(&self, deadline: DateTime<Utc>) -> AppResult<Vec<Order>> {
        self.ensure_available()?;
        Ok(self.select_unpaid(|o| o.payment_deadline < deadline))
    }

    async fn bulk_update_status(
        &self,
        ids: &[i64],
        status: OrderStatus,
        deadline: DateTime<Utc>,
    ) -> AppResult<u64> {
        self.ensure_available()?;
        self.counters.bulk_updates.fetch_add(1, Ordering::SeqCst);
        let mut orders = self.orders.write();
        let mut updated = 0;
        for id in ids {
            let Some(order) = orders.get_mut(id) else {
                continue;
            };
            if order.is_unpaid() && order.status != status && order.payment_deadline < deadline {
                order.status = status;
                updated += 1;
            }
        }
        Ok(updated)
    }
}

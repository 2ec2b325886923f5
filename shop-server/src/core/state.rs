//! 服务器状态
//!
//! 组装存储、缓存、分页器、通知器与后台任务。所有字段都是 `Arc`，克隆成本很低，
//! 直接作为 axum 的 `State` 使用。

use std::sync::Arc;

use crate::core::Config;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::notify::{ConsoleNotifier, Notifier};
use crate::pagination::{
    LimitOffsetPaginator, MemoryCache, RecordSource, SnapshotCache, SnapshotPaginator,
    SnapshotStore,
};
use crate::store::{MemoryOrderStore, OrderStore, seed_orders};
use crate::sweeper::{
    CachePurge, ExpireUnpaidOrders, SweepTask, TaskCollector, UnpaidOrderNotifier,
};
use crate::utils::{Clock, SystemClock};
use shared::models::Order;

/// 订单记录源
pub type OrderSource = dyn RecordSource<Record = Order>;

/// 服务器状态
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub orders: Arc<MemoryOrderStore>,
    pub cache: Arc<MemoryCache>,
    pub clock: Arc<dyn Clock>,
    pub notifier: Arc<dyn Notifier>,
    /// 页码分页器
    pub pages: Arc<SnapshotPaginator<OrderSource>>,
    /// 偏移分页器
    pub windows: Arc<LimitOffsetPaginator<OrderSource>>,
    pub tasks: Arc<BackgroundTasks>,
}

impl ServerState {
    /// 用给定的依赖组装状态（测试注入手动时钟和记录型通知器）
    pub fn new(
        config: Config,
        orders: Arc<MemoryOrderStore>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let cache = Arc::new(MemoryCache::new(clock.clone()));
        let snapshot_cache: Arc<dyn SnapshotCache> = cache.clone();
        let source: Arc<OrderSource> = orders.clone();

        let pages = SnapshotPaginator::new(
            source.clone(),
            SnapshotStore::new(
                snapshot_cache.clone(),
                config.page_cache.prefix.clone(),
                config.page_cache.ttl,
            ),
        )
        .with_orphans(config.pagination_orphans);
        let windows = LimitOffsetPaginator::new(
            source,
            SnapshotStore::new(
                snapshot_cache,
                config.offset_cache.prefix.clone(),
                config.offset_cache.ttl,
            ),
        );

        let tasks = Self::register_tasks(&config, &orders, &cache, &clock, &notifier);

        Self {
            config,
            orders,
            cache,
            clock,
            notifier,
            pages: Arc::new(pages),
            windows: Arc::new(windows),
            tasks: Arc::new(tasks),
        }
    }

    /// 生产环境初始化：系统时钟、控制台邮件后端、可选的测试数据
    pub fn initialize(config: &Config) -> Self {
        let orders = Arc::new(MemoryOrderStore::new());
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        if config.seed_orders > 0 {
            seed_orders(
                &orders,
                config.seed_orders,
                clock.now(),
                config.payment_deadline_days,
            );
        }

        Self::new(config.clone(), orders, clock, Arc::new(ConsoleNotifier))
    }

    fn register_tasks(
        config: &Config,
        orders: &Arc<MemoryOrderStore>,
        cache: &Arc<MemoryCache>,
        clock: &Arc<dyn Clock>,
        notifier: &Arc<dyn Notifier>,
    ) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        if config.use_task_collector {
            let store: Arc<dyn OrderStore> = orders.clone();
            let sweeps: [Arc<dyn SweepTask>; 2] = [
                Arc::new(UnpaidOrderNotifier::new(
                    store.clone(),
                    notifier.clone(),
                    clock.clone(),
                    config.business_timezone,
                    config.default_email.clone(),
                )),
                Arc::new(ExpireUnpaidOrders::new(
                    store,
                    notifier.clone(),
                    clock.clone(),
                    config.default_email.clone(),
                )),
            ];
            for sweep in sweeps {
                tasks.register(
                    TaskKind::Sweep,
                    Arc::new(TaskCollector::new(
                        sweep,
                        config.task_refresh,
                        config.task_run_on_start,
                    )),
                );
            }
        }

        tasks.register(
            TaskKind::Maintenance,
            Arc::new(TaskCollector::new(
                Arc::new(CachePurge::new(cache.clone())),
                config.cache_purge_interval,
                false,
            )),
        );

        tasks
    }

    /// 启动所有后台任务
    pub fn start_background_tasks(&self) {
        let started = self.tasks.start_all();
        self.tasks.log_summary();
        tracing::debug!(started, "Background tasks started");
    }
}

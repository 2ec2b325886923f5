//! 后台任务管理
//!
//! 统一管理所有周期任务收集器的注册、启动、重启和关闭。
//!
//! # 任务类型
//!
//! - [`TaskKind::Sweep`] - 订单生命周期清扫（提醒、过期）
//! - [`TaskKind::Maintenance`] - 维护任务（缓存清理）

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::sweeper::TaskCollector;

/// 任务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// 订单生命周期清扫
    Sweep,
    /// 维护任务
    Maintenance,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Sweep => write!(f, "Sweep"),
            TaskKind::Maintenance => write!(f, "Maintenance"),
        }
    }
}

/// 已注册的后台任务
struct RegisteredTask {
    kind: TaskKind,
    collector: Arc<TaskCollector>,
}

/// 任务状态（健康检查输出）
#[derive(Debug, Clone, Serialize)]
pub struct TaskStatus {
    pub name: &'static str,
    pub kind: TaskKind,
    pub running: bool,
    pub cycles: u64,
    pub failures: u64,
}

/// 后台任务管理器
///
/// # 使用示例
///
/// ```ignore
/// let mut tasks = BackgroundTasks::new();
/// tasks.register(TaskKind::Sweep, Arc::new(TaskCollector::new(expire, refresh, true)));
/// tasks.start_all();
///
/// // Graceful shutdown
/// tasks.shutdown().await;
/// ```
#[derive(Default)]
pub struct BackgroundTasks {
    tasks: Vec<RegisteredTask>,
    started: AtomicBool,
}

impl BackgroundTasks {
    /// 创建新的任务管理器
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个任务收集器（不启动）
    pub fn register(&mut self, kind: TaskKind, collector: Arc<TaskCollector>) {
        tracing::debug!(task = %collector.name(), kind = %kind, "Registered background task");
        self.tasks.push(RegisteredTask { kind, collector });
    }

    /// 按名称查找任务收集器
    pub fn get(&self, name: &str) -> Option<Arc<TaskCollector>> {
        self.tasks
            .iter()
            .find(|t| t.collector.name() == name)
            .map(|t| t.collector.clone())
    }

    /// 启动所有任务，返回本次新启动的数量
    pub fn start_all(&self) -> usize {
        self.started.store(true, Ordering::SeqCst);
        self.tasks.iter().filter(|t| t.collector.start()).count()
    }

    /// 重启所有任务
    pub async fn restart_all(&self) {
        for task in &self.tasks {
            task.collector.restart().await;
        }
        self.started.store(true, Ordering::SeqCst);
        tracing::info!("Restarted {} background tasks", self.tasks.len());
    }

    /// 获取已注册任务数量
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// 检查是否没有注册任务
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// 按类型统计任务数量 (sweep, maintenance)
    pub fn count_by_kind(&self) -> (usize, usize) {
        let sweep = self
            .tasks
            .iter()
            .filter(|t| t.kind == TaskKind::Sweep)
            .count();
        (sweep, self.tasks.len() - sweep)
    }

    /// 打印任务摘要
    pub fn log_summary(&self) {
        let (sweep, maintenance) = self.count_by_kind();
        tracing::info!(
            "Background tasks registered: {} total (Sweep: {}, Maintenance: {})",
            self.tasks.len(),
            sweep,
            maintenance
        );
    }

    /// 各任务状态
    pub fn status(&self) -> Vec<TaskStatus> {
        self.tasks
            .iter()
            .map(|t| TaskStatus {
                name: t.collector.name(),
                kind: t.kind,
                running: t.collector.is_running(),
                cycles: t.collector.cycles(),
                failures: t.collector.failures(),
            })
            .collect()
    }

    /// 检查所有任务健康状态
    ///
    /// 返回已启动但意外停止的任务数量。
    pub fn check_health(&self) -> usize {
        if !self.started.load(Ordering::SeqCst) {
            return 0;
        }
        let mut failed_count = 0;
        for task in &self.tasks {
            if !task.collector.is_running() {
                tracing::error!(
                    task = %task.collector.name(),
                    kind = %task.kind,
                    "Background task unexpectedly stopped!"
                );
                failed_count += 1;
            }
        }
        if failed_count > 0 {
            tracing::error!(
                failed = failed_count,
                total = self.tasks.len(),
                "Background task health check: {} task(s) failed",
                failed_count
            );
        }
        failed_count
    }

    /// Graceful shutdown - 停止所有任务并等待正在执行的周期结束
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down {} background tasks...", self.tasks.len());
        self.started.store(false, Ordering::SeqCst);

        for task in &self.tasks {
            task.collector.stop().await;
            tracing::debug!(task = %task.collector.name(), "Task stopped");
        }

        tracing::info!("All background tasks stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweeper::{SweepReport, SweepTask};
    use async_trait::async_trait;
    use shared::error::AppResult;
    use std::time::Duration;

    struct Noop(&'static str);

    #[async_trait]
    impl SweepTask for Noop {
        fn name(&self) -> &'static str {
            self.0
        }

        async fn run_cycle(&self) -> AppResult<SweepReport> {
            Ok(SweepReport::default())
        }
    }

    fn registry() -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();
        for (name, kind) in [("a", TaskKind::Sweep), ("b", TaskKind::Sweep), ("c", TaskKind::Maintenance)] {
            let collector = TaskCollector::new(Arc::new(Noop(name)), Duration::from_secs(30), true);
            tasks.register(kind, Arc::new(collector));
        }
        tasks
    }

    #[tokio::test(start_paused = true)]
    async fn test_lifecycle() {
        let tasks = registry();
        assert_eq!(tasks.count_by_kind(), (2, 1));
        assert_eq!(tasks.check_health(), 0);

        assert_eq!(tasks.start_all(), 3);
        assert_eq!(tasks.start_all(), 0);
        assert_eq!(tasks.check_health(), 0);

        tasks.get("a").unwrap().stop().await;
        assert_eq!(tasks.check_health(), 1);

        tasks.restart_all().await;
        assert_eq!(tasks.check_health(), 0);
        assert!(tasks.status().iter().all(|s| s.running));

        tasks.shutdown().await;
        assert!(tasks.status().iter().all(|s| !s.running));
        assert_eq!(tasks.check_health(), 0);
    }

    #[test]
    fn test_lookup_by_name() {
        let tasks = registry();
        assert!(tasks.get("c").is_some());
        assert!(tasks.get("z").is_none());
        assert_eq!(tasks.len(), 3);
    }
}

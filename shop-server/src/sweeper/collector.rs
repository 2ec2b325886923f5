//! 任务收集器
//!
//! 把一个 [`SweepTask`] 包装成可取消的周期循环：
//!
//! ```text
//! [sleep(refresh)] → cycle → sleep(refresh) → cycle → ...
//! ```
//!
//! 单个周期的错误或 panic 只记录日志，循环继续。`stop()` 不会打断正在执行的周期，
//! 而是等待其结束后退出。

use futures::FutureExt;
use parking_lot::Mutex;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{SweepReport, SweepTask};
use shared::error::{AppError, AppResult};

/// 运行中的循环
struct RunningLoop {
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

/// 循环共享状态
struct Shared {
    task: Arc<dyn SweepTask>,
    /// 串行化周期（循环与手动触发互斥）
    cycle_lock: tokio::sync::Mutex<()>,
    cycles: AtomicU64,
    failures: AtomicU64,
}

impl Shared {
    async fn run_cycle(&self) -> AppResult<SweepReport> {
        let _guard = self.cycle_lock.lock().await;
        let name = self.task.name();

        let result = AssertUnwindSafe(self.task.run_cycle()).catch_unwind().await;
        self.cycles.fetch_add(1, Ordering::SeqCst);

        match result {
            Ok(Ok(report)) => {
                tracing::info!(task = %name, %report, "Sweep cycle completed");
                Ok(report)
            }
            Ok(Err(e)) => {
                self.failures.fetch_add(1, Ordering::SeqCst);
                tracing::error!(task = %name, error = %e, "Sweep cycle failed");
                Err(e)
            }
            Err(panic_info) => {
                self.failures.fetch_add(1, Ordering::SeqCst);
                let panic_msg: String = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    (*s).to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                tracing::error!(task = %name, panic = %panic_msg, "Sweep cycle panicked");
                Err(AppError::internal(format!(
                    "Sweep task {} panicked: {}",
                    name, panic_msg
                )))
            }
        }
    }
}

/// 周期任务收集器
pub struct TaskCollector {
    shared: Arc<Shared>,
    refresh: Duration,
    run_on_start: bool,
    running: Mutex<Option<RunningLoop>>,
}

impl TaskCollector {
    /// `refresh` 为两次周期之间的休眠时长；`run_on_start` 为 false 时先休眠再执行第一个周期
    pub fn new(task: Arc<dyn SweepTask>, refresh: Duration, run_on_start: bool) -> Self {
        Self {
            shared: Arc::new(Shared {
                task,
                cycle_lock: tokio::sync::Mutex::new(()),
                cycles: AtomicU64::new(0),
                failures: AtomicU64::new(0),
            }),
            refresh,
            run_on_start,
            running: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &'static str {
        self.shared.task.name()
    }

    pub fn refresh(&self) -> Duration {
        self.refresh
    }

    /// 已执行的周期数（含失败）
    pub fn cycles(&self) -> u64 {
        self.shared.cycles.load(Ordering::SeqCst)
    }

    /// 失败的周期数
    pub fn failures(&self) -> u64 {
        self.shared.failures.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }

    /// 启动循环；已在运行时不做任何事并返回 false
    pub fn start(&self) -> bool {
        let mut running = self.running.lock();
        if running.as_ref().is_some_and(|r| !r.handle.is_finished()) {
            tracing::debug!(task = %self.name(), "Task collector already running");
            return false;
        }

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(run_loop(
            self.shared.clone(),
            self.refresh,
            self.run_on_start,
            shutdown.clone(),
        ));
        *running = Some(RunningLoop { shutdown, handle });
        true
    }

    /// 停止循环并等待正在执行的周期结束
    pub async fn stop(&self) {
        let running = self.running.lock().take();
        let Some(running) = running else {
            return;
        };
        running.shutdown.cancel();
        match running.handle.await {
            Ok(()) => tracing::debug!(task = %self.name(), "Task collector joined"),
            Err(e) => tracing::error!(task = %self.name(), error = ?e, "Task collector join failed"),
        }
    }

    /// 停止后以新的取消令牌重新启动
    pub async fn restart(&self) -> bool {
        self.stop().await;
        self.start()
    }

    /// 立即执行一个周期（与循环中的周期互斥）
    pub async fn run_now(&self) -> AppResult<SweepReport> {
        self.shared.run_cycle().await
    }
}

async fn run_loop(
    shared: Arc<Shared>,
    refresh: Duration,
    run_on_start: bool,
    shutdown: CancellationToken,
) {
    let name = shared.task.name();
    tracing::info!(task = %name, refresh_secs = refresh.as_secs(), "Task collector started");

    if !run_on_start && !sleep_or_cancel(refresh, &shutdown).await {
        tracing::info!(task = %name, "Task collector stopped");
        return;
    }

    loop {
        // 错误已在 run_cycle 中记录，循环继续
        let _ = shared.run_cycle().await;

        if !sleep_or_cancel(refresh, &shutdown).await {
            break;
        }
    }

    tracing::info!(task = %name, "Task collector stopped");
}

/// 休眠 `duration`；被取消时返回 false
async fn sleep_or_cancel(duration: Duration, shutdown: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = shutdown.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}

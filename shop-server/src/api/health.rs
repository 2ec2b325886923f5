//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /health | GET | 健康检查与后台任务状态 |
//!
//! ```json
//! {
//!   "status": "ok",
//!   "version": "0.1.0",
//!   "environment": "development",
//!   "background_tasks": [{ "name": "expire_unpaid_orders", "kind": "sweep", "running": true, "cycles": 3, "failures": 0 }]
//! }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::{ServerState, TaskStatus};

/// 健康检查路由
pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

/// 健康检查响应
#[derive(Serialize)]
pub struct HealthResponse {
    /// 状态 (ok | degraded)
    status: &'static str,
    version: &'static str,
    environment: String,
    background_tasks: Vec<TaskStatus>,
}

async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let failed = state.tasks.check_health();
    Json(HealthResponse {
        status: if failed == 0 { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        background_tasks: state.tasks.status(),
    })
}

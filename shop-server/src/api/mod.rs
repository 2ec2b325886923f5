//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查和后台任务状态
//! - [`orders`] - 订单列表（页码分页、偏移分页）

pub mod health;
pub mod orders;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(orders::router())
}

/// Router bound to `state`, with HTTP request tracing
pub fn build_router(state: ServerState) -> Router {
    build_app()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

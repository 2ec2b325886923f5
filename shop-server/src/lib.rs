//! Shop Server - 快照分页与订单生命周期清扫
//!
//! # 架构概述
//!
//! - **分页** (`pagination`): 基于标识符快照缓存的页码/偏移分页，避免每次请求的 COUNT 与 OFFSET 扫描
//! - **存储** (`store`): 订单存储接口与内存实现
//! - **通知** (`notify`): 尽力而为的邮件通知
//! - **清扫** (`sweeper`): 付款期限提醒、未付款订单过期、缓存清理
//! - **HTTP API** (`api`): 订单列表与健康检查
//!
//! # 模块结构
//!
//! ```text
//! shop-server/src/
//! ├── core/          # 配置、状态、服务器、后台任务
//! ├── pagination/    # 查询签名、快照缓存、分页器
//! ├── store/         # 订单存储
//! ├── notify/        # 通知
//! ├── sweeper/       # 周期清扫任务
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志、时间
//! ```

pub mod api;
pub mod core;
pub mod notify;
pub mod pagination;
pub mod store;
pub mod sweeper;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, Server, ServerState};
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// 设置运行环境：加载 `.env` 并初始化日志
pub fn setup_environment() -> anyhow::Result<Config> {
    // .env is optional
    let _ = dotenv::dotenv();

    let config = Config::from_env();
    init_logger_with_file(
        &config.log_level,
        config.log_json,
        config.log_dir.as_deref(),
    )?;
    Ok(config)
}

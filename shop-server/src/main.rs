use shop_server::{Server, ServerState, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 日志) 并加载配置
    let config = setup_environment()?;

    tracing::info!(
        environment = %config.environment,
        sweeper = config.use_task_collector,
        "Shop server starting..."
    );

    // 2. 初始化服务器状态
    let state = ServerState::initialize(&config);

    // 3. 启动 HTTP 服务器 (Server::run 会启动后台任务并在退出时关闭)
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}

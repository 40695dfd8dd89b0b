use anyhow::Context;
use hall_server::{Config, Server, ServerState, init_logger_with_file, print_banner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 日志)
    dotenv::dotenv().ok();
    let config = Config::from_env();

    if let Some(dir) = &config.log_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("create log dir {}", dir))?;
    }
    init_logger_with_file(
        Some(&config.log_level),
        config.is_production(),
        config.log_dir.as_deref(),
    );

    print_banner();
    tracing::info!(environment = %config.environment, work_dir = %config.work_dir, "Bingo hall server starting...");

    // 2. 初始化服务器状态 (数据库 + 启动恢复)
    let state = ServerState::initialize(&config).context("initialize server state")?;

    // 3. 启动 HTTP + WebSocket 服务器 (Server::run 会启动后台任务)
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}

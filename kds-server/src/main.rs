use kds_server::{Server, print_banner, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 配置, 日志)
    let config = setup_environment()?;

    print_banner();

    tracing::info!(
        port = config.http_port,
        environment = %config.environment,
        auto_complete_secs = config.auto_complete.as_secs(),
        "KDS server starting..."
    );

    // 2. 启动服务器 (数据库、后台任务、HTTP + Socket.IO)
    let server = Server::new(config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}

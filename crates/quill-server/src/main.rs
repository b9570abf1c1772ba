use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use quill::config::QuillConfig;
use quill_server::logging::init_logging;
use quill_server::{build_router, AppState};
use tokio::net::TcpListener;

#[derive(Debug, Parser)]
#[command(name = "quilld", version, about = "Quill 标注与宏观数据服务")]
struct Cli {
    /// 配置文件路径，缺省时读取当前目录下的 quill.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 覆盖监听地址
    #[arg(long)]
    host: Option<String>,

    /// 覆盖监听端口
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = QuillConfig::load(cli.config.as_deref()).context("加载配置失败")?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let _guard = init_logging(&config.logging)?;

    let state = AppState::from_config(&config).await?;
    let app = build_router(state);

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("无法监听 {}", addr))?;
    tracing::info!(%addr, "quilld 已启动");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("quilld 已退出");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "监听退出信号失败");
    }
}

//! # Courier-Oxide 服务入口
//!
//! Courier-Oxide HTTP 服务器的入口点，提供基于会话的远程浏览器自动化服务。
//!
//! ## 主要功能
//! - 初始化并配置 HTTP 服务器（单一端点形态，方法由路径选择）
//! - 管理有界工作者池与会话 keep-alive 生命周期
//! - 后台清扫过期会话
//! - 实现优雅关闭和会话清理
//!
//! ## 架构
//! 服务由以下核心组件构成：
//! - **协议层**: 类型化请求体、响应信封与调试产物编码
//! - **工作者池**: 有界槽位、准入控制与 keep-alive 过期
//! - **流水线**: 导航 → 动作序列 → 数据提取 → 内容捕获
//! - **页面后端**: 抽象浏览器引擎接口（独立部署时使用 Mock 后端）
//!
//! ## 环境变量
//! - `COURIER_HOST`: 服务器监听地址（默认: 127.0.0.1）
//! - `COURIER_PORT`: 服务器监听端口（默认: 8377）
//! - `COURIER_API_KEY`: 调用所需的 API key
//! - `COURIER_MAX_WORKERS`: 并发工作者上限（默认: 4）
//! - `COURIER_CONFIG`: TOML 配置文件路径（可选，优先于环境变量默认值）

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use courier_oxide::{
    backend::{BackendOptions, MockPageBackend, PageBackend},
    config::Config,
    pool::WorkerPool,
    server::{self, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing - respect RUST_LOG environment variable
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|v| v.parse::<Level>().ok())
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    info!("Courier-Oxide Server v{}", courier_oxide::VERSION);

    // Load configuration
    let config = match std::env::var("COURIER_CONFIG") {
        Ok(path) => Config::from_file(&path)?,
        Err(_) => Config::from_env()?,
    };
    info!(
        "Configuration loaded: host={}, port={}, max_workers={}",
        config.host, config.port, config.max_workers
    );

    // Page backend factory. The browser engine is an external
    // collaborator; a standalone deployment serves the mock backend.
    let backend_factory: courier_oxide::backend::BackendFactory =
        Arc::new(|options: BackendOptions| {
            Ok(Arc::new(MockPageBackend::with_options(options)) as Arc<dyn PageBackend>)
        });
    warn!("no browser engine attached; serving the mock page backend");

    // Create worker pool
    let pool = Arc::new(WorkerPool::from_config(&config, backend_factory));
    info!(
        "Worker pool initialized: {} slots, default keep-alive {}s",
        config.max_workers, config.default_keep_alive
    );

    let sweep_interval = Duration::from_secs(config.sweep_interval.max(1));
    let config = Arc::new(config);
    let state = AppState::new(pool.clone(), config.clone());

    // Start expired-session sweep task
    tokio::spawn(server::sweep_loop(pool.clone(), sweep_interval));

    // Bind listener
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Starting HTTP server on {}", addr);

    // Serve with graceful shutdown on SIGTERM/SIGINT
    axum::serve(listener, server::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // Cleanup all sessions
    info!("Cleaning up all sessions...");
    match pool.drain() {
        Ok(workers) => {
            let closers = workers.into_iter().map(|worker| {
                let backend = worker.backend();
                async move { backend.close().await }
            });
            for result in futures::future::join_all(closers).await {
                if let Err(e) = result {
                    warn!("Failed to release backend: {}", e);
                }
            }
        }
        Err(e) => warn!("Failed to drain sessions: {}", e),
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM signal");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT signal");
            }
        }
    }

    #[cfg(windows)]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received Ctrl+C signal");
    }
}

use color_eyre::eyre::{eyre, Context};
use color_eyre::Result;
use database::{MemoryProjectRepository, ProjectRepository};
use shared_lib::{AppConfig, StorageBackend};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use web_service::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // 默认info级别，可通过 RUST_LOG 调整
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;

    // 关闭信号：ctrl-c 之后通知 web 服务停止
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("监听 ctrl-c 信号失败: {e}");
        }
        info!("收到关闭信号");
        let _ = shutdown_tx.send(true);
    });

    match config.storage {
        StorageBackend::Memory => {
            warn!("⚠️ 使用内存存储，进程退出后数据会丢失");
            let state = AppState::new(MemoryProjectRepository::new());
            web_service::start_web_service(state, &config.bind_addr, shutdown_rx).await?;
        }
        StorageBackend::Postgres => {
            let db_config = config
                .database
                .as_ref()
                .ok_or_else(|| eyre!("Missing database config for postgres storage"))?;

            let pool = database::initialize_database(db_config)
                .await
                .context("Connect to postgresql database")?;

            let state = AppState::new(ProjectRepository::new(pool.clone()));
            let served = web_service::start_web_service(state, &config.bind_addr, shutdown_rx).await;

            // 无论服务是否正常退出都要释放连接池
            database::close_database(pool).await;
            served?;
        }
    }

    info!("👋 服务已退出");
    Ok(())
}

//! Web服务模块
//!
//! 提供 issue 跟踪的 HTTP API 接口和文档服务

use color_eyre::eyre::Context;
use color_eyre::Result;
use database::ProjectRepositoryTrait;
use tokio::net::TcpListener;
use tokio::sync::watch::Receiver;
use tracing::info;

pub mod models;
pub mod routes;
pub mod services;

use services::IssueService;

/// 应用共享状态
///
/// 每个请求都会clone一次，内部只有 `Arc`，代价很低
#[derive(Clone)]
pub struct AppState {
    pub issue_service: IssueService,
}

impl AppState {
    /// 使用指定的存储仓库创建共享状态
    pub fn new<PR: ProjectRepositoryTrait>(project_repository: PR) -> Self {
        Self {
            issue_service: IssueService::new(project_repository),
        }
    }
}

/// 启动 Web 服务
///
/// 收到关闭信号后停止接收新连接，等待已有请求处理完成再返回
pub async fn start_web_service(shared_state: AppState, bind_addr: &str, shutdown_rx: Receiver<bool>) -> Result<()> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Bind web service to {bind_addr}"))?;

    serve(listener, shared_state, shutdown_rx).await
}

/// 在已绑定的监听器上提供服务
///
/// 测试中绑定 `127.0.0.1:0` 后直接调用，方便拿到实际端口
pub async fn serve(listener: TcpListener, shared_state: AppState, mut shutdown_rx: Receiver<bool>) -> Result<()> {
    let router = routes::create_app_router(shared_state);

    info!("🚀 启动 Web Service 在 {}", listener.local_addr()?);

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            // 发送端被drop也视为关闭信号
            let _ = shutdown_rx.changed().await;
            info!("🛑 Web Service 正在关闭...");
        })
        .await?;

    Ok(())
}

//! 路由入口
//!
//! 提供 [`create_app_router`] 函数，导出当前App的所有路由。
//!
//! 用户可以在导出路由时传入共享数据 shared_state，这样所有路由函数都可以访问。

use crate::models::common::ErrorReply;
use crate::routes::health::health_check;
use crate::routes::issues::__path_create_issue;
use crate::routes::issues::__path_delete_issue;
use crate::routes::issues::__path_list_issues;
use crate::routes::issues::__path_update_issue;
use crate::routes::issues::{create_issue, delete_issue, list_issues, update_issue};
use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_scalar::{Scalar, Servable};

pub mod health;
pub mod issues;

/// 导出当前App的所有路由
///
/// ## 参数定义
/// - state: 共享数据，参考 [`AppState`] 定义。存放issue服务（内部持有存储仓库）。
///
/// ## **❗️注意事项：**
///
/// 由于 [`routes!`] 宏限制，在同一个宏里面不能同时定义多个相同类型的http接口。
/// 这里四个接口的方法各不相同（get/post/put/delete），所以可以放在一起。
fn routers(state: AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_issues, create_issue, update_issue, delete_issue))
        .with_state(state)
}

/// 创建当前App的路由
///
/// 完成以下功能：
/// - 生成OpenAPI文档
/// - 生成App路由
/// - 使用Scalar作为最终在线文档格式
/// - 健康检查接口 `/health`
pub fn create_app_router(shared_state: AppState) -> Router {
    // 当前项目的OpenAPI声明
    #[derive(OpenApi)]
    #[openapi(
        tags(
            (name = "issues", description = r#"
Issue跟踪接口：

- 按项目查询/过滤issue
- 创建、更新、删除issue
            "#)
        ),
        components(schemas(ErrorReply)),
    )]
    struct ApiDoc;

    // 最终拿到的变量：
    // - router: Axum的Router，实际的路由对象
    // - api: utoipa的OpenApi，生成的OpenAPI对象
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routers(shared_state))
        .split_for_parts();

    // 合并文档路由，用户可通过 /docs 访问文档网页地址
    router
        .route("/health", get(health_check))
        .merge(Scalar::with_url("/docs", api))
}

//! issue相关接口
//!
//! 四个接口共用同一个路径 `/api/issues/{project}`，按HTTP方法区分。
//!
//! 业务错误（参数缺失、找不到issue等）统一返回200，body中带 `error` 字段；
//! 只有存储层故障才会返回500，参考 [`AppError`]。

use crate::models::common::ActionReply;
use crate::models::err::AppError;
use crate::models::filter::IssueFilter;
use crate::models::issues::{IssueCreate, IssueDelete, IssueInfo, IssueUpdate};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::Uri;
use axum::Json;
use tracing::debug;

/// 查询项目下的issue
///
/// 任意查询参数都会作为过滤条件，issue需要同时满足所有条件。
/// 参数值 `true` / `false` 会被当作布尔值比较，其余按字符串比较。
///
/// 项目不存在时返回空数组。
#[utoipa::path(get,
    path = "/issues/{project}",
    tag = "issues",
    params(
        ("project" = String, Path, description = "项目名称"),
    ),
    responses(
        (status = 200, description = "Matching issues", body = Vec<IssueInfo>)
    ),
)]
pub async fn list_issues(
    State(state): State<AppState>,
    Path(project): Path<String>,
    uri: Uri,
) -> Result<Json<Vec<IssueInfo>>, AppError> {
    // 查询参数的key不固定，所以直接从uri解析成键值对列表
    let Query(query) = Query::<Vec<(String, String)>>::try_from_uri(&uri)?;
    debug!("🔍 查询项目 {} 的issue, 过滤条件: {:?}", project, query);

    let filter = IssueFilter::from_query(query);
    let issues = state.issue_service.list_issues(&project, &filter).await?;

    Ok(Json(issues.into_iter().map(Into::into).collect()))
}

/// 创建issue
///
/// `issue_title` / `issue_text` / `created_by` 为必填字段，项目不存在时会自动创建。
#[utoipa::path(post,
    path = "/issues/{project}",
    tag = "issues",
    params(
        ("project" = String, Path, description = "项目名称"),
    ),
    request_body = IssueCreate,
    responses(
        (status = 200, description = "Created issue, or `{error}` when required fields are missing", body = IssueInfo)
    ),
)]
pub async fn create_issue(
    State(state): State<AppState>,
    Path(project): Path<String>,
    Json(create): Json<IssueCreate>,
) -> Result<Json<IssueInfo>, AppError> {
    debug!("Creating issue in {} {:#?}", project, create);

    let issue = state.issue_service.create_issue(&project, create).await?;

    Ok(Json(issue.into()))
}

/// 更新issue
///
/// 请求体中的空字符串字段视为未提交；没有请求体时按缺少 `_id` 处理。
#[utoipa::path(put,
    path = "/issues/{project}",
    tag = "issues",
    params(
        ("project" = String, Path, description = "项目名称"),
    ),
    request_body = IssueUpdate,
    responses(
        (status = 200, description = "`{result, _id}` on success, otherwise `{error, _id?}`", body = ActionReply),
        (status = 500, description = "Store failure"),
    ),
)]
pub async fn update_issue(
    State(state): State<AppState>,
    Path(project): Path<String>,
    update: Option<Json<IssueUpdate>>,
) -> Result<Json<ActionReply>, AppError> {
    let update = update.map(|Json(u)| u).unwrap_or_default();
    debug!("Updating issue in {} with {:#?}", project, update);

    let id = state.issue_service.update_issue(&project, update).await?;

    Ok(Json(ActionReply::new("successfully updated", id)))
}

/// 删除issue
///
/// 没有请求体时按缺少 `_id` 处理。
#[utoipa::path(delete,
    path = "/issues/{project}",
    tag = "issues",
    params(
        ("project" = String, Path, description = "项目名称"),
    ),
    request_body = IssueDelete,
    responses(
        (status = 200, description = "`{result, _id}` on success, otherwise `{error, _id?}`", body = ActionReply),
        (status = 500, description = "Store failure"),
    ),
)]
pub async fn delete_issue(
    State(state): State<AppState>,
    Path(project): Path<String>,
    delete: Option<Json<IssueDelete>>,
) -> Result<Json<ActionReply>, AppError> {
    let delete = delete.map(|Json(d)| d).unwrap_or_default();
    debug!("delete issue in {} {:#?}", project, delete);

    let id = state.issue_service.delete_issue(&project, delete).await?;

    Ok(Json(ActionReply::new("successfully deleted", id)))
}

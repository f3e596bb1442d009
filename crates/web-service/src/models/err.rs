use crate::models::common::ErrorReply;
use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use database::DatabaseError;
use thiserror::Error;
use tracing::error;

/// issue接口的业务拒绝
///
/// 这些都是用户参数导致的错误，统一以200状态码返回，body中带 `error` 字段
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IssueRejection {
    #[error("required field(s) missing")]
    RequiredFieldsMissing,

    #[error("missing _id")]
    MissingId,

    /// 项目不存在或issue不存在
    #[error("could not update")]
    CouldNotUpdate(String),

    #[error("no update field(s) sent")]
    NoUpdateFields(String),

    /// 项目不存在或issue不存在
    #[error("could not delete")]
    CouldNotDelete(String),
}

impl IssueRejection {
    /// 请求中携带的 `_id`，用于原样返回
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::RequiredFieldsMissing | Self::MissingId => None,
            Self::CouldNotUpdate(id) | Self::NoUpdateFields(id) | Self::CouldNotDelete(id) => Some(id),
        }
    }
}

impl IntoResponse for IssueRejection {
    fn into_response(self) -> Response {
        let reply = ErrorReply {
            error: self.to_string(),
            id: self.id().map(str::to_string),
        };
        (StatusCode::OK, Json(reply)).into_response()
    }
}

/// 使用 [`thiserror`] 定义错误类型
/// 方便根据类型转换为相应的http错误码
#[derive(Error, Debug)]
pub enum AppError {
    /// 业务拒绝，返回200
    #[error(transparent)]
    Rejected(#[from] IssueRejection),

    /// 查询参数无法解析，返回400
    #[error(transparent)]
    QueryRejected(#[from] QueryRejection),

    /// 仓库层数据库错误，返回500
    #[error(transparent)]
    RepositoryError(#[from] DatabaseError),
}

/// Tell axum how to convert `AppError` into a response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Rejected(rejection) => rejection.into_response(),
            AppError::QueryRejected(rejection) => rejection.into_response(),
            AppError::RepositoryError(err) => {
                error!("❌ 存储层错误: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Repository error: {err}")).into_response()
            }
        }
    }
}

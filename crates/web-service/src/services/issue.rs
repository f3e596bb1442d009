//! issue服务
//!
//! 提供issue列表过滤、创建、更新、删除的业务逻辑。
//! 业务拒绝以 [`IssueRejection`] 返回，存储层错误以 [`database::DatabaseError`] 返回，
//! 二者都包装在 [`AppError`] 中。

use crate::models::err::{AppError, IssueRejection};
use crate::models::filter::IssueFilter;
use crate::models::issues::{IssueCreate, IssueDelete, IssueUpdate, OpenFlag};
use database::{Issue, IssueDraft, IssueId, ProjectRepositoryTrait};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

/// 由存储层生成的字段，客户端提交时忽略
const RESERVED_FIELDS: [&str; 3] = ["_id", "created_on", "updated_on"];

#[derive(Clone)]
pub struct IssueService {
    project_repository: Arc<dyn ProjectRepositoryTrait>,
}

impl IssueService {
    pub fn new<PR: ProjectRepositoryTrait>(project_repository: PR) -> Self {
        Self {
            project_repository: Arc::new(project_repository),
        }
    }

    /// 查询项目下符合过滤条件的issue
    ///
    /// 项目不存在时返回空列表，和“项目存在但没有issue”不做区分
    pub async fn list_issues(&self, project: &str, filter: &IssueFilter) -> Result<Vec<Issue>, AppError> {
        let Some(found) = self.project_repository.find_project(project).await? else {
            debug!("项目 {} 不存在，返回空列表", project);
            return Ok(Vec::new());
        };

        if filter.is_empty() {
            return Ok(found.issues);
        }

        Ok(found.issues.into_iter().filter(|i| filter.matches(i)).collect())
    }

    /// 创建issue
    ///
    /// 项目不存在时先创建项目。必填字段缺失时不会产生任何写入。
    pub async fn create_issue(&self, project: &str, create: IssueCreate) -> Result<Issue, AppError> {
        if let Err(err) = create.validate() {
            debug!("必填字段校验失败: {err}");
            return Err(IssueRejection::RequiredFieldsMissing.into());
        }

        let extra: Map<String, Value> = create
            .extra
            .into_iter()
            .filter(|(key, _)| !RESERVED_FIELDS.contains(&key.as_str()))
            .collect();

        let draft = IssueDraft {
            issue_title: create.issue_title.unwrap_or_default(),
            issue_text: create.issue_text.unwrap_or_default(),
            created_by: create.created_by.unwrap_or_default(),
            assigned_to: create.assigned_to.unwrap_or_default(),
            status_text: create.status_text.unwrap_or_default(),
            open: create.open.as_ref().and_then(OpenFlag::resolve).unwrap_or(true),
            extra,
        };

        if self.project_repository.find_project(project).await?.is_none() {
            self.project_repository.create_project(project).await?;
        }

        let issue = self.project_repository.append_issue(project, draft).await?;
        Ok(issue)
    }

    /// 更新issue
    ///
    /// 按顺序判断，任何一步失败都不会产生写入：
    /// 1. 缺少 `_id`
    /// 2. 项目不存在
    /// 3. issue不存在（包括 `_id` 格式不合法）
    /// 4. 没有任何可更新字段
    ///
    /// 成功时返回请求中的 `_id`
    pub async fn update_issue(&self, project: &str, update: IssueUpdate) -> Result<String, AppError> {
        let id = match update.id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Err(IssueRejection::MissingId.into()),
        };

        let Some(found) = self.project_repository.find_project(project).await? else {
            return Err(IssueRejection::CouldNotUpdate(id).into());
        };

        let Some(issue_id) = IssueId::parse(&id).filter(|i| found.issue(i).is_some()) else {
            return Err(IssueRejection::CouldNotUpdate(id).into());
        };

        let changes = update.changes();
        if changes.is_empty() {
            return Err(IssueRejection::NoUpdateFields(id).into());
        }

        // 查找和写入之间issue可能已被并发删除
        match self.project_repository.update_issue(project, &issue_id, changes).await? {
            Some(_) => Ok(id),
            None => Err(IssueRejection::CouldNotUpdate(id).into()),
        }
    }

    /// 删除issue，成功时返回请求中的 `_id`
    pub async fn delete_issue(&self, project: &str, delete: IssueDelete) -> Result<String, AppError> {
        let id = match delete.id {
            Some(id) if !id.is_empty() => id,
            _ => return Err(IssueRejection::MissingId.into()),
        };

        let Some(issue_id) = IssueId::parse(&id) else {
            return Err(IssueRejection::CouldNotDelete(id).into());
        };

        // 项目不存在和issue不存在返回同一个错误
        if self.project_repository.remove_issue(project, &issue_id).await? {
            Ok(id)
        } else {
            Err(IssueRejection::CouldNotDelete(id).into())
        }
    }
}

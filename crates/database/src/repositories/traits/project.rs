//! 项目仓库 trait 定义
//!
//! 定义项目/issue文档存储的抽象接口

use crate::models::{Issue, IssueChanges, IssueDraft, IssueId, Project};
use crate::DatabaseResult;

/// 项目仓库trait定义
///
/// 项目以名称为唯一键，issue内嵌在项目文档中。所有写操作都是对单个项目文档的整体写入，
/// 方法返回即代表已经持久化。
#[async_trait::async_trait]
pub trait ProjectRepositoryTrait: Send + Sync + 'static {
    /// 根据名称精确查找项目
    ///
    /// 项目不存在时返回 `None`，不是错误
    async fn find_project(&self, name: &str) -> DatabaseResult<Option<Project>>;

    /// 创建空项目
    ///
    /// 同名项目已存在时直接返回已有项目
    async fn create_project(&self, name: &str) -> DatabaseResult<Project>;

    /// 向项目追加issue
    ///
    /// 存储层分配标识和时间戳（`created_on = updated_on = now`），返回存储后的issue。
    /// 项目不存在时返回 [`crate::DatabaseError::NotFound`]。
    async fn append_issue(&self, name: &str, draft: IssueDraft) -> DatabaseResult<Issue>;

    /// 更新项目中的指定issue
    ///
    /// 项目或issue不存在时返回 `None`；成功时刷新 `updated_on` 并返回更新后的issue
    async fn update_issue(&self, name: &str, id: &IssueId, changes: IssueChanges) -> DatabaseResult<Option<Issue>>;

    /// 从项目中移除指定issue
    ///
    /// # 返回值
    /// 是否发生了移除
    async fn remove_issue(&self, name: &str, id: &IssueId) -> DatabaseResult<bool>;
}

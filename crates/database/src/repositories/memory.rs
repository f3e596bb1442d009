//! 内存项目仓库
//!
//! 数据只存在于进程内，适用于本地调试（`STORAGE_BACKEND=memory`）和测试。
//! 所有操作都持有同一把 [`RwLock`]，写操作对整个项目文档生效。

use crate::models::{Issue, IssueChanges, IssueDraft, IssueId, Project};
use crate::repositories::traits::ProjectRepositoryTrait;
use crate::{DatabaseError, DatabaseResult};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct MemoryProjectRepository {
    projects: Arc<RwLock<HashMap<String, Project>>>,
}

impl MemoryProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ProjectRepositoryTrait for MemoryProjectRepository {
    async fn find_project(&self, name: &str) -> DatabaseResult<Option<Project>> {
        debug!("🔍 查找项目: {}", name);
        Ok(self.projects.read().await.get(name).cloned())
    }

    async fn create_project(&self, name: &str) -> DatabaseResult<Project> {
        debug!("📝 创建项目: {}", name);

        let mut projects = self.projects.write().await;
        let project = projects
            .entry(name.to_string())
            .or_insert_with(|| Project::new(name));
        Ok(project.clone())
    }

    async fn append_issue(&self, name: &str, draft: IssueDraft) -> DatabaseResult<Issue> {
        let mut projects = self.projects.write().await;
        let project = projects
            .get_mut(name)
            .ok_or_else(|| DatabaseError::not_found(format!("project `{name}`")))?;

        let issue = draft.into_issue(IssueId::generate(), Utc::now());
        project.issues.push(issue.clone());

        debug!("✅ issue创建成功: {}", issue.id);
        Ok(issue)
    }

    async fn update_issue(&self, name: &str, id: &IssueId, changes: IssueChanges) -> DatabaseResult<Option<Issue>> {
        let mut projects = self.projects.write().await;
        let Some(issue) = projects.get_mut(name).and_then(|p| p.issue_mut(id)) else {
            return Ok(None);
        };

        issue.apply(changes, Utc::now());
        Ok(Some(issue.clone()))
    }

    async fn remove_issue(&self, name: &str, id: &IssueId) -> DatabaseResult<bool> {
        let mut projects = self.projects.write().await;
        Ok(projects.get_mut(name).is_some_and(|p| p.remove_issue(id)))
    }
}

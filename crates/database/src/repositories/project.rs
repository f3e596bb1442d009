//! 项目仓库
//!
//! 负责项目/issue文档在PostgreSQL中的读写

use crate::models::{Issue, IssueChanges, IssueDraft, IssueId, Project};
use crate::repositories::traits::ProjectRepositoryTrait;
use crate::{DatabaseError, DatabaseResult};
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

/// 项目文档行
///
/// `issues` 列为JSONB数组，直接反序列化为 [`Issue`] 列表
#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    project: String,
    issues: Json<Vec<Issue>>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            name: row.project,
            issues: row.issues.0,
        }
    }
}

/// 项目仓库结构体
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    /// 创建新的项目仓库实例
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 在事务中锁定并读取项目文档
    ///
    /// 使用 `FOR UPDATE` 行锁，保证同一项目的“读取-修改-写回”不会交错执行
    async fn lock_project(tx: &mut Transaction<'_, Postgres>, name: &str) -> DatabaseResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT project, issues
            FROM issue_tracker.projects
            WHERE project = $1
            FOR UPDATE
            "#,
        )
        .bind(name)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(row.map(Into::into))
    }

    /// 整体写回项目的issue列表
    async fn save_issues(tx: &mut Transaction<'_, Postgres>, project: &Project) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            UPDATE issue_tracker.projects
            SET issues = $2,
                updated_at = now()
            WHERE project = $1
            "#,
        )
        .bind(&project.name)
        .bind(Json(&project.issues))
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl ProjectRepositoryTrait for ProjectRepository {
    async fn find_project(&self, name: &str) -> DatabaseResult<Option<Project>> {
        debug!("🔍 查找项目: {}", name);

        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT project, issues
            FROM issue_tracker.projects
            WHERE project = $1
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// 创建空项目
    ///
    /// `ON CONFLICT` 保证并发创建同名项目时不会报唯一键冲突，而是返回已有项目
    async fn create_project(&self, name: &str) -> DatabaseResult<Project> {
        debug!("📝 创建项目: {}", name);

        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            INSERT INTO issue_tracker.projects (project, issues, created_at, updated_at)
            VALUES ($1, '[]'::jsonb, now(), now())
            ON CONFLICT (project) DO UPDATE SET project = EXCLUDED.project
            RETURNING project, issues;
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        debug!("✅ 项目创建成功: {}", name);
        Ok(row.into())
    }

    /// 向项目追加issue
    ///
    /// 追加使用单条 `UPDATE`，由数据库完成JSONB数组拼接，不需要先读出整个文档
    async fn append_issue(&self, name: &str, draft: IssueDraft) -> DatabaseResult<Issue> {
        let issue = draft.into_issue(IssueId::generate(), Utc::now());
        debug!("📝 项目 {} 新增issue: {:#?}", name, issue);

        let result = sqlx::query(
            r#"
            UPDATE issue_tracker.projects
            SET issues = issues || jsonb_build_array($2::jsonb),
                updated_at = now()
            WHERE project = $1
            "#,
        )
        .bind(name)
        .bind(Json(&issue))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(format!("project `{name}`")));
        }

        debug!("✅ issue创建成功: {}", issue.id);
        Ok(issue)
    }

    async fn update_issue(&self, name: &str, id: &IssueId, changes: IssueChanges) -> DatabaseResult<Option<Issue>> {
        debug!("🔄 更新项目 {} 的issue {}: {:#?}", name, id, changes);

        let mut tx = self.pool.begin().await?;

        // 提前返回时事务被drop，自动回滚并释放行锁
        let Some(mut project) = Self::lock_project(&mut tx, name).await? else {
            return Ok(None);
        };
        let Some(issue) = project.issue_mut(id) else {
            return Ok(None);
        };

        issue.apply(changes, Utc::now());
        let updated = issue.clone();

        Self::save_issues(&mut tx, &project).await?;
        tx.commit().await?;

        debug!("✅ issue更新成功: {}", id);
        Ok(Some(updated))
    }

    async fn remove_issue(&self, name: &str, id: &IssueId) -> DatabaseResult<bool> {
        debug!("🗑️ 删除项目 {} 的issue {}", name, id);

        let mut tx = self.pool.begin().await?;

        let Some(mut project) = Self::lock_project(&mut tx, name).await? else {
            return Ok(false);
        };
        if !project.remove_issue(id) {
            return Ok(false);
        }

        Self::save_issues(&mut tx, &project).await?;
        tx.commit().await?;

        debug!("✅ issue删除成功: {}", id);
        Ok(true)
    }
}

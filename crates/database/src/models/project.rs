//! 项目数据库模型
//!
//! 一个项目即一份文档：项目名称 + 按插入顺序排列的issue列表

use crate::models::issue::{Issue, IssueId};

/// 项目文档
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    /// 项目名称，唯一
    pub name: String,

    /// 项目下的issue，保持插入顺序
    pub issues: Vec<Issue>,
}

impl Project {
    /// 创建空项目
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            issues: Vec::new(),
        }
    }

    pub fn issue(&self, id: &IssueId) -> Option<&Issue> {
        self.issues.iter().find(|i| &i.id == id)
    }

    pub fn issue_mut(&mut self, id: &IssueId) -> Option<&mut Issue> {
        self.issues.iter_mut().find(|i| &i.id == id)
    }

    /// 移除指定issue，返回是否发生了移除
    pub fn remove_issue(&mut self, id: &IssueId) -> bool {
        let before = self.issues.len();
        self.issues.retain(|i| &i.id != id);
        self.issues.len() != before
    }
}

//! 数据库模型模块
//!
//! 这里定义与数据库文档对应的结构体和相关操作

pub mod issue;
pub mod project;

// 重新导出具体的模型
pub use issue::{FieldValue, Issue, IssueChanges, IssueDraft, IssueField, IssueId};
pub use project::Project;

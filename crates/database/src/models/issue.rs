//! Issue文档模型
//!
//! issue内嵌存放在项目文档中，这里定义issue本身、创建草稿以及更新字段集合。

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;

/// 由存储层生成的issue唯一标识
///
/// 格式为24位小写十六进制字符：4字节秒级时间戳（大端） + 8字节随机数。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(String);

impl IssueId {
    /// 生成新的标识
    pub fn generate() -> Self {
        let secs = Utc::now().timestamp() as u32;
        let tail: [u8; 8] = rand::random();

        let mut id = format!("{secs:08x}");
        for b in tail {
            id.push_str(&format!("{b:02x}"));
        }
        Self(id)
    }

    /// 解析客户端传入的标识
    ///
    /// 格式不合法时返回 `None`，调用方应当按“未找到”处理，而不是当作请求错误。
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.len() == 24 && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self(raw.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 已存储的issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "_id")]
    pub id: IssueId,
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    #[serde(default)]
    pub assigned_to: String,
    #[serde(default)]
    pub status_text: String,
    #[serde(default = "default_open")]
    pub open: bool,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,

    /// 创建时客户端额外提交的字段，原样保存
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_open() -> bool {
    true
}

/// issue上可以被查询过滤的字段
///
/// 不在此枚举中的字段名会去 [`Issue::extra`] 中查找。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueField {
    Id,
    IssueTitle,
    IssueText,
    CreatedBy,
    AssignedTo,
    StatusText,
    Open,
    CreatedOn,
    UpdatedOn,
}

impl IssueField {
    pub fn from_name(name: &str) -> Option<Self> {
        let field = match name {
            "_id" => Self::Id,
            "issue_title" => Self::IssueTitle,
            "issue_text" => Self::IssueText,
            "created_by" => Self::CreatedBy,
            "assigned_to" => Self::AssignedTo,
            "status_text" => Self::StatusText,
            "open" => Self::Open,
            "created_on" => Self::CreatedOn,
            "updated_on" => Self::UpdatedOn,
            _ => return None,
        };
        Some(field)
    }
}

/// 字段取值，用于和过滤条件做严格类型比较
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(Cow<'a, str>),
    Bool(bool),
}

impl Issue {
    /// 按字段名取值，字段不存在时返回 `None`
    pub fn field_value(&self, name: &str) -> Option<FieldValue<'_>> {
        let Some(field) = IssueField::from_name(name) else {
            return match self.extra.get(name)? {
                Value::String(s) => Some(FieldValue::Text(Cow::Borrowed(s.as_str()))),
                Value::Bool(b) => Some(FieldValue::Bool(*b)),
                Value::Number(n) => Some(FieldValue::Text(Cow::Owned(n.to_string()))),
                _ => None,
            };
        };

        let value = match field {
            IssueField::Id => FieldValue::Text(Cow::Borrowed(self.id.as_str())),
            IssueField::IssueTitle => FieldValue::Text(Cow::Borrowed(self.issue_title.as_str())),
            IssueField::IssueText => FieldValue::Text(Cow::Borrowed(self.issue_text.as_str())),
            IssueField::CreatedBy => FieldValue::Text(Cow::Borrowed(self.created_by.as_str())),
            IssueField::AssignedTo => FieldValue::Text(Cow::Borrowed(self.assigned_to.as_str())),
            IssueField::StatusText => FieldValue::Text(Cow::Borrowed(self.status_text.as_str())),
            IssueField::Open => FieldValue::Bool(self.open),
            IssueField::CreatedOn => FieldValue::Text(Cow::Owned(render_timestamp(&self.created_on))),
            IssueField::UpdatedOn => FieldValue::Text(Cow::Owned(render_timestamp(&self.updated_on))),
        };
        Some(value)
    }

    /// 应用更新字段并刷新 `updated_on`
    pub fn apply(&mut self, changes: IssueChanges, now: DateTime<Utc>) {
        if let Some(v) = changes.issue_title {
            self.issue_title = v;
        }
        if let Some(v) = changes.issue_text {
            self.issue_text = v;
        }
        if let Some(v) = changes.created_by {
            self.created_by = v;
        }
        if let Some(v) = changes.assigned_to {
            self.assigned_to = v;
        }
        if let Some(v) = changes.status_text {
            self.status_text = v;
        }
        if let Some(v) = changes.open {
            self.open = v;
        }
        // 保证 created_on <= updated_on
        self.updated_on = now.max(self.created_on);
    }
}

/// 与序列化保持一致的时间戳文本格式
fn render_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// issue创建草稿
///
/// 必填字段已经过校验，标识和时间戳由存储层分配。
#[derive(Debug, Clone, Default)]
pub struct IssueDraft {
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,
    pub open: bool,
    pub extra: Map<String, Value>,
}

impl IssueDraft {
    pub fn into_issue(self, id: IssueId, now: DateTime<Utc>) -> Issue {
        Issue {
            id,
            issue_title: self.issue_title,
            issue_text: self.issue_text,
            created_by: self.created_by,
            assigned_to: self.assigned_to,
            status_text: self.status_text,
            open: self.open,
            created_on: now,
            updated_on: now,
            extra: self.extra,
        }
    }
}

/// issue更新字段集合
///
/// 每个可更新字段对应一个 [`Option`]，`None` 表示不修改。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueChanges {
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    pub open: Option<bool>,
}

impl IssueChanges {
    pub fn is_empty(&self) -> bool {
        self.issue_title.is_none()
            && self.issue_text.is_none()
            && self.created_by.is_none()
            && self.assigned_to.is_none()
            && self.status_text.is_none()
            && self.open.is_none()
    }
}

use crate::models::filter::FilterValue;
use chrono::{DateTime, Utc};
use database::{Issue, IssueChanges};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use utoipa::ToSchema;
use validator::Validate;

/// 把任意JSON值转换为文本
///
/// 字符串原样返回，`null` 视为未提交，其余值（数字、布尔、数组、对象）使用JSON文本形式。
pub fn loose_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// 文本字段的宽松反序列化，不因为类型不符拒绝整个请求体
fn de_loose_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(loose_text))
}

/// `open` 字段的宽松反序列化
///
/// 布尔值原样保留，其余值转换为文本后交给 [`OpenFlag::resolve`]
fn de_open_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<OpenFlag>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => Some(OpenFlag::Bool(b)),
        other => other.as_ref().and_then(loose_text).map(OpenFlag::Text),
    })
}

/// `open` 字段的宽松取值
///
/// 客户端既可能提交JSON布尔值，也可能提交 `"true"` / `"false"` 字符串（例如来自表单），
/// 其他类型的值按文本处理。
#[derive(Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(untagged)]
pub enum OpenFlag {
    Bool(bool),
    Text(String),
}

impl OpenFlag {
    /// 解析为布尔值
    ///
    /// - 布尔值原样返回
    /// - 空字符串视为未提交，返回 `None`
    /// - `"false"` 返回 `false`；`"true"` 以及其他非空文本返回 `true`
    pub fn resolve(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Text(s) if s.is_empty() => None,
            Self::Text(s) => match FilterValue::parse(s) {
                FilterValue::Bool(b) => Some(b),
                FilterValue::Text(_) => Some(true),
            },
        }
    }
}

/// 创建issue的请求体
///
/// 除了下面列出的字段，客户端提交的其他字段也会原样保存到issue上。
/// 文本字段提交数字或布尔值时转换为文本。
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct IssueCreate {
    #[schema(example = "Fix error in posting data")]
    #[serde(default, deserialize_with = "de_loose_text")]
    #[validate(required, length(min = 1))]
    pub issue_title: Option<String>,

    #[schema(example = "When we post data it has an error.")]
    #[serde(default, deserialize_with = "de_loose_text")]
    #[validate(required, length(min = 1))]
    pub issue_text: Option<String>,

    #[schema(example = "Joe")]
    #[serde(default, deserialize_with = "de_loose_text")]
    #[validate(required, length(min = 1))]
    pub created_by: Option<String>,

    #[schema(example = "Joe")]
    #[serde(default, deserialize_with = "de_loose_text")]
    pub assigned_to: Option<String>,

    #[schema(example = "In QA")]
    #[serde(default, deserialize_with = "de_loose_text")]
    pub status_text: Option<String>,

    /// 默认为 `true`
    #[serde(default, deserialize_with = "de_open_flag")]
    pub open: Option<OpenFlag>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// 更新issue的请求体
///
/// `_id` 不是字符串时转换为文本，之后按“未找到”处理。
#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct IssueUpdate {
    #[schema(example = "5f665eb46e296f6b9b6a504d")]
    #[serde(rename = "_id", default, deserialize_with = "de_loose_text")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "de_loose_text")]
    pub issue_title: Option<String>,
    #[serde(default, deserialize_with = "de_loose_text")]
    pub issue_text: Option<String>,
    #[serde(default, deserialize_with = "de_loose_text")]
    pub created_by: Option<String>,
    #[serde(default, deserialize_with = "de_loose_text")]
    pub assigned_to: Option<String>,
    #[serde(default, deserialize_with = "de_loose_text")]
    pub status_text: Option<String>,
    #[serde(default, deserialize_with = "de_open_flag")]
    pub open: Option<OpenFlag>,
}

impl IssueUpdate {
    /// 提取可更新字段，空字符串视为未提交
    pub fn changes(&self) -> IssueChanges {
        let non_empty = |v: &Option<String>| v.as_ref().filter(|s| !s.is_empty()).cloned();

        IssueChanges {
            issue_title: non_empty(&self.issue_title),
            issue_text: non_empty(&self.issue_text),
            created_by: non_empty(&self.created_by),
            assigned_to: non_empty(&self.assigned_to),
            status_text: non_empty(&self.status_text),
            open: self.open.as_ref().and_then(OpenFlag::resolve),
        }
    }
}

/// 删除issue的请求体
#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct IssueDelete {
    #[schema(example = "5f665eb46e296f6b9b6a504d")]
    #[serde(rename = "_id", default, deserialize_with = "de_loose_text")]
    pub id: Option<String>,
}

/// issue返回对象
#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct IssueInfo {
    #[schema(example = "5f665eb46e296f6b9b6a504d")]
    #[serde(rename = "_id")]
    pub id: String,

    #[schema(example = "Fix error in posting data")]
    pub issue_title: String,

    #[schema(example = "When we post data it has an error.")]
    pub issue_text: String,

    #[schema(example = "Joe")]
    pub created_by: String,

    #[schema(example = "Joe")]
    pub assigned_to: String,

    #[schema(example = "In QA")]
    pub status_text: String,

    pub open: bool,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,

    /// 创建时提交的额外字段
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl From<Issue> for IssueInfo {
    fn from(issue: Issue) -> Self {
        Self {
            id: issue.id.to_string(),
            issue_title: issue.issue_title,
            issue_text: issue.issue_text,
            created_by: issue.created_by,
            assigned_to: issue.assigned_to,
            status_text: issue.status_text,
            open: issue.open,
            created_on: issue.created_on,
            updated_on: issue.updated_on,
            extra: issue.extra.into_iter().collect(),
        }
    }
}

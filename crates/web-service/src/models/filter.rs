//! 列表查询的过滤条件
//!
//! 查询参数中的每一对 `key=value` 都是一个过滤条件，issue必须满足全部条件（AND）才会返回。

use database::{FieldValue, Issue};

/// 过滤条件的取值
///
/// 只有字面量 `"true"` / `"false"` 会被解析为布尔值，其余一律按字符串处理。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Bool(bool),
}

impl FilterValue {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            other => Self::Text(other.to_string()),
        }
    }

    /// 严格类型比较：字符串不会等于布尔值
    pub fn matches(&self, value: &FieldValue<'_>) -> bool {
        match (self, value) {
            (Self::Text(expected), FieldValue::Text(actual)) => expected == actual,
            (Self::Bool(expected), FieldValue::Bool(actual)) => expected == actual,
            _ => false,
        }
    }
}

/// 一组过滤条件
#[derive(Debug, Clone, Default)]
pub struct IssueFilter {
    predicates: Vec<(String, FilterValue)>,
}

impl IssueFilter {
    pub fn from_query(pairs: Vec<(String, String)>) -> Self {
        let predicates = pairs
            .into_iter()
            .map(|(key, value)| {
                let value = FilterValue::parse(&value);
                (key, value)
            })
            .collect();
        Self { predicates }
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// issue上不存在的字段视为不匹配
    pub fn matches(&self, issue: &Issue) -> bool {
        self.predicates.iter().all(|(key, expected)| {
            issue
                .field_value(key)
                .is_some_and(|actual| expected.matches(&actual))
        })
    }
}

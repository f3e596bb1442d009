use serde::Serialize;
use utoipa::ToSchema;

/// 写操作成功后的返回对象
///
/// 固定格式：`{"result": "...", "_id": "..."}`
#[derive(Debug, ToSchema, Serialize)]
pub struct ActionReply {
    #[schema(example = "successfully updated")]
    pub result: String,

    #[schema(example = "5f665eb46e296f6b9b6a504d")]
    #[serde(rename = "_id")]
    pub id: String,
}

impl ActionReply {
    pub fn new(result: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            result: result.into(),
            id: id.into(),
        }
    }
}

/// 业务拒绝时的返回对象
///
/// `_id` 仅在请求中带了标识时才会返回
#[derive(Debug, ToSchema, Serialize)]
pub struct ErrorReply {
    #[schema(example = "could not update")]
    pub error: String,

    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

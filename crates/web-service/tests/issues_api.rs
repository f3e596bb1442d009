use chrono::{DateTime, Utc};
use database::{
    DatabaseError, Issue, IssueChanges, IssueDraft, IssueId, MemoryProjectRepository, Project,
    ProjectRepositoryTrait,
};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::watch;
use web_service::AppState;

/// 所有操作都失败的仓库，模拟数据库不可用
struct UnavailableRepository;

#[async_trait::async_trait]
impl ProjectRepositoryTrait for UnavailableRepository {
    async fn find_project(&self, _name: &str) -> Result<Option<Project>, DatabaseError> {
        Err(DatabaseError::connection("connection refused"))
    }

    async fn create_project(&self, _name: &str) -> Result<Project, DatabaseError> {
        Err(DatabaseError::connection("connection refused"))
    }

    async fn append_issue(&self, _name: &str, _draft: IssueDraft) -> Result<Issue, DatabaseError> {
        Err(DatabaseError::connection("connection refused"))
    }

    async fn update_issue(
        &self,
        _name: &str,
        _id: &IssueId,
        _changes: IssueChanges,
    ) -> Result<Option<Issue>, DatabaseError> {
        Err(DatabaseError::connection("connection refused"))
    }

    async fn remove_issue(&self, _name: &str, _id: &IssueId) -> Result<bool, DatabaseError> {
        Err(DatabaseError::connection("connection refused"))
    }
}

/// 启动一个使用内存存储的服务
///
/// 返回的 `Sender` 需要在测试期间保持存活，drop后服务会关闭
async fn spawn_app() -> (String, watch::Sender<bool>) {
    spawn_with_state(AppState::new(MemoryProjectRepository::new())).await
}

async fn spawn_with_state(state: AppState) -> (String, watch::Sender<bool>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        web_service::serve(listener, state, shutdown_rx).await.unwrap();
    });

    (format!("http://{addr}"), shutdown_tx)
}

async fn post_issue(client: &Client, url: &str, body: Value) -> Value {
    let res = client.post(url).json(&body).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

async fn list(client: &Client, url: &str, query: &[(&str, &str)]) -> Vec<Value> {
    let res = client.get(url).query(query).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    res.json().await.unwrap()
}

async fn put(client: &Client, url: &str, body: Value) -> Value {
    let res = client.put(url).json(&body).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

async fn delete(client: &Client, url: &str, body: Value) -> Value {
    let res = client.delete(url).json(&body).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

fn timestamp(value: &Value) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value.as_str().unwrap())
        .unwrap()
        .with_timezone(&Utc)
}

fn full_issue() -> Value {
    json!({
        "issue_title": "test",
        "issue_text": "abc123",
        "created_by": "Joe",
        "assigned_to": "Jill",
        "status_text": "In QA"
    })
}

#[tokio::test]
async fn test_create_issue_with_every_field() {
    let (base, _shutdown) = spawn_app().await;
    let client = Client::new();
    let url = format!("{base}/api/issues/apitest");

    let body = post_issue(&client, &url, full_issue()).await;

    assert_eq!(body["issue_title"], "test");
    assert_eq!(body["issue_text"], "abc123");
    assert_eq!(body["created_by"], "Joe");
    assert_eq!(body["assigned_to"], "Jill");
    assert_eq!(body["status_text"], "In QA");
    assert_eq!(body["open"], true);
    assert!(body["_id"].as_str().is_some_and(|id| !id.is_empty()));

    let now = Utc::now();
    assert!(timestamp(&body["created_on"]) <= now);
    assert!(timestamp(&body["updated_on"]) <= now);
}

#[tokio::test]
async fn test_create_issue_with_only_required_fields() {
    let (base, _shutdown) = spawn_app().await;
    let client = Client::new();
    let url = format!("{base}/api/issues/apitest");

    let body = post_issue(
        &client,
        &url,
        json!({
            "issue_title": "test",
            "issue_text": "abc123",
            "created_by": "Joe",
            "assigned_to": "",
            "status_text": ""
        }),
    )
    .await;

    assert_eq!(body["assigned_to"], "");
    assert_eq!(body["status_text"], "");
    assert_eq!(body["open"], true);
}

#[tokio::test]
async fn test_create_issue_keeps_extra_fields() {
    let (base, _shutdown) = spawn_app().await;
    let client = Client::new();
    let url = format!("{base}/api/issues/apitest");

    let mut issue = full_issue();
    issue["severity"] = json!("high");
    let body = post_issue(&client, &url, issue).await;
    assert_eq!(body["severity"], "high");

    let filtered = list(&client, &url, &[("severity", "high")]).await;
    assert_eq!(filtered.len(), 1);
}

#[tokio::test]
async fn test_create_issue_with_missing_required_fields() {
    let (base, _shutdown) = spawn_app().await;
    let client = Client::new();
    let url = format!("{base}/api/issues/apitest");

    let body = post_issue(
        &client,
        &url,
        json!({
            "issue_title": "",
            "issue_text": "",
            "created_by": "",
            "assigned_to": "Ardecy",
            "status_text": "In QA"
        }),
    )
    .await;

    assert_eq!(body, json!({ "error": "required field(s) missing" }));
    assert!(list(&client, &url, &[]).await.is_empty());
}

#[tokio::test]
async fn test_view_issues_on_unknown_project() {
    let (base, _shutdown) = spawn_app().await;
    let client = Client::new();

    let issues = list(&client, &format!("{base}/api/issues/nobody-home"), &[]).await;
    assert!(issues.is_empty());
}

#[tokio::test]
async fn test_view_issues_with_filters() {
    let (base, _shutdown) = spawn_app().await;
    let client = Client::new();
    let url = format!("{base}/api/issues/apitest");

    let jill = post_issue(&client, &url, full_issue()).await;
    let mut other = full_issue();
    other["assigned_to"] = json!("Jack");
    let jack = post_issue(&client, &url, other).await;
    let closed = post_issue(&client, &url, full_issue()).await;
    put(&client, &url, json!({ "_id": closed["_id"], "open": "false" })).await;

    let all = list(&client, &url, &[]).await;
    assert_eq!(all.len(), 3);
    assert!(all[0].get("issue_title").is_some());
    assert!(all[0].get("created_by").is_some());
    assert!(all[0].get("updated_on").is_some());

    let open = list(&client, &url, &[("open", "true")]).await;
    assert_eq!(open.len(), 2);
    assert!(open.iter().all(|i| i["open"] == true));

    let both = list(&client, &url, &[("open", "true"), ("assigned_to", "Jill")]).await;
    assert_eq!(both.len(), 1);
    assert_eq!(both[0]["_id"], jill["_id"]);

    let jacks = list(&client, &url, &[("assigned_to", "Jack")]).await;
    assert_eq!(jacks.len(), 1);
    assert_eq!(jacks[0]["_id"], jack["_id"]);

    let unknown_field = list(&client, &url, &[("milestone", "v1")]).await;
    assert!(unknown_field.is_empty());
}

#[tokio::test]
async fn test_update_issue_paths() {
    let (base, _shutdown) = spawn_app().await;
    let client = Client::new();
    let url = format!("{base}/api/issues/apitest");

    let created = post_issue(&client, &url, full_issue()).await;
    let id = created["_id"].as_str().unwrap().to_string();

    // 更新单个字段
    let body = put(&client, &url, json!({ "_id": id, "issue_title": "Project X" })).await;
    assert_eq!(body, json!({ "result": "successfully updated", "_id": id }));

    let stored = list(&client, &url, &[("_id", id.as_str())]).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["issue_title"], "Project X");
    assert_eq!(stored[0]["issue_text"], created["issue_text"]);
    assert_eq!(stored[0]["assigned_to"], created["assigned_to"]);
    assert_eq!(stored[0]["created_on"], created["created_on"]);
    assert!(timestamp(&stored[0]["updated_on"]) >= timestamp(&created["updated_on"]));

    // 更新多个字段
    let body = put(
        &client,
        &url,
        json!({
            "_id": id,
            "issue_title": "Project XX",
            "issue_text": "rename project",
            "status_text": "updated",
            "assigned_to": "Jack"
        }),
    )
    .await;
    assert_eq!(body["result"], "successfully updated");

    // 缺少 _id
    let body = put(&client, &url, json!({ "issue_title": "Project XX" })).await;
    assert_eq!(body, json!({ "error": "missing _id" }));

    // 没有可更新字段
    let body = put(&client, &url, json!({ "_id": id })).await;
    assert_eq!(body, json!({ "error": "no update field(s) sent", "_id": id }));

    // 非法 _id
    let body = put(&client, &url, json!({ "_id": "abc123", "issue_text": "test" })).await;
    assert_eq!(body, json!({ "error": "could not update", "_id": "abc123" }));

    // 格式合法但不存在的 _id
    let body = put(
        &client,
        &url,
        json!({ "_id": "5f665eb46e296f6b9b6a504d", "issue_text": "test" }),
    )
    .await;
    assert_eq!(body, json!({ "error": "could not update", "_id": "5f665eb46e296f6b9b6a504d" }));

    // 项目不存在
    let body = put(
        &client,
        &format!("{base}/api/issues/other"),
        json!({ "_id": id, "issue_text": "test" }),
    )
    .await;
    assert_eq!(body, json!({ "error": "could not update", "_id": id }));
}

#[tokio::test]
async fn test_update_open_with_false_string() {
    let (base, _shutdown) = spawn_app().await;
    let client = Client::new();
    let url = format!("{base}/api/issues/apitest");

    let created = post_issue(&client, &url, full_issue()).await;
    let body = put(&client, &url, json!({ "_id": created["_id"], "open": "false" })).await;
    assert_eq!(body["result"], "successfully updated");

    let closed = list(&client, &url, &[("open", "false")]).await;
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0]["open"], false);
}

#[tokio::test]
async fn test_delete_issue_paths() {
    let (base, _shutdown) = spawn_app().await;
    let client = Client::new();
    let url = format!("{base}/api/issues/apitest");

    let created = post_issue(&client, &url, full_issue()).await;
    let id = created["_id"].as_str().unwrap().to_string();

    let body = delete(&client, &url, json!({ "_id": "" })).await;
    assert_eq!(body, json!({ "error": "missing _id" }));

    let body = delete(&client, &url, json!({})).await;
    assert_eq!(body, json!({ "error": "missing _id" }));

    let body = delete(&client, &url, json!({ "_id": "abc123" })).await;
    assert_eq!(body, json!({ "error": "could not delete", "_id": "abc123" }));

    let body = delete(&client, &format!("{base}/api/issues/other"), json!({ "_id": id })).await;
    assert_eq!(body, json!({ "error": "could not delete", "_id": id }));

    let body = delete(&client, &url, json!({ "_id": id })).await;
    assert_eq!(body, json!({ "result": "successfully deleted", "_id": id }));

    assert!(list(&client, &url, &[]).await.is_empty());

    let body = delete(&client, &url, json!({ "_id": id })).await;
    assert_eq!(body, json!({ "error": "could not delete", "_id": id }));
}

#[tokio::test]
async fn test_non_string_id_is_not_found() {
    let (base, _shutdown) = spawn_app().await;
    let client = Client::new();
    let url = format!("{base}/api/issues/apitest");
    post_issue(&client, &url, full_issue()).await;

    let body = put(&client, &url, json!({ "_id": 12345, "issue_text": "x" })).await;
    assert_eq!(body, json!({ "error": "could not update", "_id": "12345" }));

    let body = delete(&client, &url, json!({ "_id": 12345 })).await;
    assert_eq!(body, json!({ "error": "could not delete", "_id": "12345" }));

    assert_eq!(list(&client, &url, &[]).await.len(), 1);
}

#[tokio::test]
async fn test_missing_body_is_missing_id() {
    let (base, _shutdown) = spawn_app().await;
    let client = Client::new();
    let url = format!("{base}/api/issues/apitest");

    let res = client.delete(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "missing _id" }));

    let res = client.put(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "missing _id" }));
}

#[tokio::test]
async fn test_create_coerces_non_string_fields() {
    let (base, _shutdown) = spawn_app().await;
    let client = Client::new();
    let url = format!("{base}/api/issues/apitest");

    let mut issue = full_issue();
    issue["assigned_to"] = json!(7);
    issue["open"] = json!(0);
    let body = post_issue(&client, &url, issue).await;

    assert_eq!(body["assigned_to"], "7");
    assert_eq!(body["open"], true);

    let mut closed = full_issue();
    closed["open"] = json!(false);
    let body = post_issue(&client, &url, closed).await;
    assert_eq!(body["open"], false);
}

#[tokio::test]
async fn test_store_failure_is_server_error() {
    let (base, _shutdown) = spawn_with_state(AppState::new(UnavailableRepository)).await;
    let client = Client::new();
    let url = format!("{base}/api/issues/apitest");
    let id = "5f665eb46e296f6b9b6a504d";

    let responses = vec![
        client.get(&url).send().await.unwrap(),
        client.post(&url).json(&full_issue()).send().await.unwrap(),
        client
            .put(&url)
            .json(&json!({ "_id": id, "issue_text": "x" }))
            .send()
            .await
            .unwrap(),
        client.delete(&url).json(&json!({ "_id": id })).send().await.unwrap(),
    ];

    for res in responses {
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let text = res.text().await.unwrap();
        assert!(text.contains("connection refused"), "unexpected body: {text}");
    }
}

#[tokio::test]
async fn test_issue_round_trip() {
    let (base, _shutdown) = spawn_app().await;
    let client = Client::new();
    let url = format!("{base}/api/issues/roundtrip");

    let created = post_issue(&client, &url, full_issue()).await;
    let id = created["_id"].as_str().unwrap().to_string();

    let listed = list(&client, &url, &[]).await;
    assert_eq!(listed, vec![created.clone()]);

    put(&client, &url, json!({ "_id": id, "status_text": "Done" })).await;

    let listed = list(&client, &url, &[]).await;
    assert_eq!(listed.len(), 1);
    let mut expected = created.clone();
    expected["status_text"] = json!("Done");
    expected["updated_on"] = listed[0]["updated_on"].clone();
    assert_eq!(listed[0], expected);

    delete(&client, &url, json!({ "_id": id })).await;
    assert!(list(&client, &url, &[]).await.is_empty());
}

#[tokio::test]
async fn test_health_check() {
    let (base, _shutdown) = spawn_app().await;

    let body: Value = Client::new()
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "healthy");
}

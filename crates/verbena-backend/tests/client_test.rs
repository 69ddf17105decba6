//! Integration tests against a local mock backend.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{Json, Path};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use serde_json::{Value, json};
use verbena_backend::{BackendClient, BackendError, NodeSaver, SchemaType, ToolSession};
use verbena_config::{ConfigMap, object_from_value};
use verbena_state::{ConfigEditor, ConfigSaver, RemoteValidator, ToolSpec, ValidationPolicy};

async fn schema(Path(tool_id): Path<String>) -> (StatusCode, Json<Value>) {
  if tool_id == "missing" {
    return (
      StatusCode::NOT_FOUND,
      Json(json!({ "detail": "Tool not found" })),
    );
  }
  (
    StatusCode::OK,
    Json(json!({
      "title": "Acme CRM",
      "properties": {
        "api_key": { "type": "string" },
        "page_size": { "type": "integer", "minimum": 1, "default": 50 }
      },
      "required": ["api_key"]
    })),
  )
}

async fn validate(Json(config): Json<Value>) -> Json<Value> {
  let blank = config
    .get("api_key")
    .and_then(Value::as_str)
    .is_none_or(str::is_empty);
  if blank {
    Json(json!({ "valid": false, "errors": { "api_key": "API key is required" } }))
  } else {
    Json(json!({ "valid": true, "errors": {} }))
  }
}

async fn test_run(Path(tool_id): Path<String>, Json(config): Json<Value>) -> Json<Value> {
  if tool_id == "slow" {
    tokio::time::sleep(Duration::from_secs(30)).await;
  }
  Json(json!({ "success": true, "output": config, "duration_ms": 12 }))
}

async fn save(Path(node_id): Path<String>) -> (StatusCode, Json<Value>) {
  if node_id == "locked" {
    return (
      StatusCode::CONFLICT,
      Json(json!({ "error": "Node is locked" })),
    );
  }
  (StatusCode::OK, Json(json!({ "id": node_id })))
}

async fn spawn_backend() -> SocketAddr {
  let app = Router::new()
    .route("/tools/{tool_id}/schema", get(schema))
    .route("/tools/{tool_id}/validate", post(validate))
    .route("/tools/{tool_id}/test", post(test_run))
    .route("/nodes/{node_id}/config", put(save));

  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, app).await.unwrap();
  });
  addr
}

fn client(addr: SocketAddr) -> BackendClient {
  BackendClient::new(&format!("http://{}", addr)).unwrap()
}

fn obj(value: Value) -> ConfigMap {
  object_from_value(value).unwrap()
}

#[tokio::test]
async fn test_fetch_schema_seeds_generic_defaults() {
  let addr = spawn_backend().await;
  let schema = client(addr).fetch_schema("acme_crm").await.unwrap();

  assert_eq!(schema.title.as_deref(), Some("Acme CRM"));
  assert_eq!(schema.properties["page_size"].schema_type(), SchemaType::Integer);

  let defaults = schema.defaults();
  assert_eq!(defaults["page_size"], 50);
  assert_eq!(defaults["api_key"], "");
}

#[tokio::test]
async fn test_backend_detail_becomes_status_error() {
  let addr = spawn_backend().await;
  let err = client(addr).fetch_schema("missing").await.unwrap_err();

  let BackendError::Status { status, message } = err else {
    panic!("expected a status error, got {:?}", err);
  };
  assert_eq!(status, 404);
  assert_eq!(message, "Tool not found");
}

#[tokio::test]
async fn test_validate_remote_returns_field_errors() {
  let addr = spawn_backend().await;
  let client = client(addr);

  let errors = client
    .validate_remote("acme_crm", &obj(json!({ "api_key": "" })))
    .await
    .unwrap();
  assert_eq!(errors["api_key"], "API key is required");

  let errors = client
    .validate_remote("acme_crm", &obj(json!({ "api_key": "k" })))
    .await
    .unwrap();
  assert!(errors.is_empty());
}

#[tokio::test]
async fn test_tool_test_echoes_outcome() {
  let addr = spawn_backend().await;
  let outcome = client(addr)
    .test_tool("http_request", &obj(json!({ "url": "https://example.com" })))
    .await
    .unwrap();

  assert!(outcome.success);
  assert_eq!(outcome.duration_ms, Some(12));
  assert_eq!(outcome.output.unwrap()["url"], "https://example.com");
}

#[tokio::test]
async fn test_node_saver_reports_backend_error() {
  let addr = spawn_backend().await;

  NodeSaver::new(client(addr), "n1")
    .save(&ConfigMap::new())
    .await
    .unwrap();

  let err = NodeSaver::new(client(addr), "locked")
    .save(&ConfigMap::new())
    .await
    .unwrap_err();
  assert!(err.to_string().contains("Node is locked"));
}

#[tokio::test]
async fn test_unreachable_backend_is_http_error() {
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  drop(listener);

  let err = client(addr).fetch_schema("acme_crm").await.unwrap_err();
  assert!(matches!(err, BackendError::Http(_)));
}

#[tokio::test]
async fn test_generic_editor_validates_through_session() {
  let addr = spawn_backend().await;
  let session = ToolSession::new(Arc::new(client(addr)), "acme_crm");

  let schema = session.fetch_schema().await.unwrap();
  let mut spec = ToolSpec::new("acme_crm", schema.defaults());
  spec.policy = ValidationPolicy::Remote;
  let mut editor = ConfigEditor::new(Arc::new(spec), &ConfigMap::new());

  let errors = editor.check(&session).await.unwrap();
  assert_eq!(errors.len(), 1);
  assert_eq!(errors[0].field.as_deref(), Some("api_key"));

  editor.update_field("api_key", json!("secret"));
  assert!(editor.check(&session).await.unwrap().is_empty());

  editor.save(&session.saver("n1")).await.unwrap();
  assert!(!editor.is_dirty());
}

#[tokio::test]
async fn test_session_validator_uses_its_client_for_other_tools() {
  let addr = spawn_backend().await;
  let session = ToolSession::new(Arc::new(client(addr)), "acme_crm");

  let errors = RemoteValidator::validate(&session, "other_tool", &ConfigMap::new())
    .await
    .unwrap();
  assert!(errors.contains_key("api_key"));
}

#[tokio::test]
async fn test_cancel_all_stops_slow_test_run() {
  let addr = spawn_backend().await;
  let client = Arc::new(client(addr));
  let slow = ToolSession::new(client.clone(), "slow");

  let config = ConfigMap::new();
  let stale = slow.test(&config);
  let cancel = async {
    tokio::time::sleep(Duration::from_millis(50)).await;
    slow.cancel_all();
  };
  let (stale, ()) = tokio::join!(stale, cancel);
  assert!(matches!(stale, Err(BackendError::Cancelled)));

  let fast = ToolSession::new(client, "http_request");
  let outcome = fast.test(&ConfigMap::new()).await.unwrap();
  assert!(outcome.success);
}

#[tokio::test]
async fn test_dropping_session_cancels_in_flight() {
  let addr = spawn_backend().await;
  let session = ToolSession::new(Arc::new(client(addr)), "slow");
  let token = session.token().clone();

  let handle = tokio::spawn(async move {
    let config = ConfigMap::new();
    tokio::select! {
      result = session.test(&config) => Some(result),
      _ = tokio::time::sleep(Duration::from_millis(50)) => None,
    }
  });

  // The select above times out and drops the session with the task.
  assert!(handle.await.unwrap().is_none());
  assert!(token.is_cancelled());
}

#[tokio::test]
async fn test_parent_token_cancels_session() {
  let addr = spawn_backend().await;
  let parent = tokio_util::sync::CancellationToken::new();
  let session = ToolSession::with_parent(Arc::new(client(addr)), "slow", &parent);

  let config = ConfigMap::new();
  let run = session.test(&config);
  let cancel = async {
    tokio::time::sleep(Duration::from_millis(50)).await;
    parent.cancel();
  };
  let (result, ()) = tokio::join!(run, cancel);
  assert!(matches!(result, Err(BackendError::Cancelled)));
}

use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::Method;
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use crate::error::ProxyError;
use crate::forward::ProxyState;

/// All proxy routes.
///
/// | route                           | method | backend path               |
/// |---------------------------------|--------|----------------------------|
/// | `/api/feedback/submit`          | POST   | `/feedback/submit`         |
/// | `/api/feedback/stats`           | GET    | `/feedback/stats`          |
/// | `/api/tools/{tool_id}/schema`   | GET    | `/tools/{tool_id}/schema`  |
/// | `/api/tools/{tool_id}/validate` | POST   | `/tools/{tool_id}/validate`|
/// | `/api/tools/{tool_id}/test`     | POST   | `/tools/{tool_id}/test`    |
/// | `/api/nodes/{node_id}/config`   | PUT    | `/nodes/{node_id}/config`  |
/// | `/api/health`                   | GET    | answered locally           |
pub fn router(state: ProxyState) -> Router {
  Router::new()
    .route("/api/health", get(health))
    .route("/api/feedback/submit", post(feedback_submit))
    .route("/api/feedback/stats", get(feedback_stats))
    .route("/api/tools/{tool_id}/schema", get(tool_schema))
    .route("/api/tools/{tool_id}/validate", post(tool_validate))
    .route("/api/tools/{tool_id}/test", post(tool_test))
    .route("/api/nodes/{node_id}/config", put(node_config))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn health() -> Json<Value> {
  Json(json!({ "status": "ok" }))
}

async fn feedback_submit(
  State(state): State<ProxyState>,
  RawQuery(query): RawQuery,
  body: Bytes,
) -> Result<Response, ProxyError> {
  state
    .forward(Method::POST, &["feedback", "submit"], query.as_deref(), body)
    .await
}

async fn feedback_stats(
  State(state): State<ProxyState>,
  RawQuery(query): RawQuery,
) -> Result<Response, ProxyError> {
  state
    .forward(Method::GET, &["feedback", "stats"], query.as_deref(), Bytes::new())
    .await
}

async fn tool_schema(
  State(state): State<ProxyState>,
  Path(tool_id): Path<String>,
  RawQuery(query): RawQuery,
) -> Result<Response, ProxyError> {
  state
    .forward(
      Method::GET,
      &["tools", &tool_id, "schema"],
      query.as_deref(),
      Bytes::new(),
    )
    .await
}

async fn tool_validate(
  State(state): State<ProxyState>,
  Path(tool_id): Path<String>,
  RawQuery(query): RawQuery,
  body: Bytes,
) -> Result<Response, ProxyError> {
  state
    .forward(
      Method::POST,
      &["tools", &tool_id, "validate"],
      query.as_deref(),
      body,
    )
    .await
}

async fn tool_test(
  State(state): State<ProxyState>,
  Path(tool_id): Path<String>,
  RawQuery(query): RawQuery,
  body: Bytes,
) -> Result<Response, ProxyError> {
  state
    .forward(Method::POST, &["tools", &tool_id, "test"], query.as_deref(), body)
    .await
}

async fn node_config(
  State(state): State<ProxyState>,
  Path(node_id): Path<String>,
  RawQuery(query): RawQuery,
  body: Bytes,
) -> Result<Response, ProxyError> {
  state
    .forward(
      Method::PUT,
      &["nodes", &node_id, "config"],
      query.as_deref(),
      body,
    )
    .await
}

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;
use verbena_config::ConfigMap;
use verbena_state::{BoxError, ConfigSaver, RemoteValidator};

use crate::error::BackendError;
use crate::schema::{FieldErrors, ToolSchema};

/// Result of a tool test run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
  #[serde(default)]
  pub success: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub output: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub duration_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
  #[serde(default)]
  valid: bool,
  #[serde(default)]
  errors: FieldErrors,
}

/// HTTP client for the tool backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
  http: Client,
  base_url: Url,
}

impl BackendClient {
  pub fn new(base_url: &str) -> Result<Self, BackendError> {
    Self::with_client(Client::new(), base_url)
  }

  /// Use an existing `reqwest::Client`, sharing its connection pool.
  pub fn with_client(http: Client, base_url: &str) -> Result<Self, BackendError> {
    let base_url =
      Url::parse(base_url).map_err(|e| BackendError::InvalidUrl(format!("{}: {}", base_url, e)))?;
    if base_url.cannot_be_a_base() {
      return Err(BackendError::InvalidUrl(base_url.to_string()));
    }
    Ok(Self { http, base_url })
  }

  pub fn base_url(&self) -> &Url {
    &self.base_url
  }

  /// `GET /tools/{tool_id}/schema`
  pub async fn fetch_schema(&self, tool_id: &str) -> Result<ToolSchema, BackendError> {
    let url = self.endpoint(&["tools", tool_id, "schema"])?;
    let schema: ToolSchema = self.send(Method::GET, url, None).await?;
    debug!(
      tool_id,
      fields = schema.properties.len(),
      "fetched tool schema"
    );
    Ok(schema)
  }

  /// `POST /tools/{tool_id}/validate`
  ///
  /// Returns field-level errors; empty when the backend reports the
  /// configuration valid.
  pub async fn validate_remote(
    &self,
    tool_id: &str,
    config: &ConfigMap,
  ) -> Result<FieldErrors, BackendError> {
    let url = self.endpoint(&["tools", tool_id, "validate"])?;
    let response: ValidateResponse = self.send(Method::POST, url, Some(config)).await?;

    if !response.valid && response.errors.is_empty() {
      return Err(BackendError::Decode(
        "validation failed without field errors".to_string(),
      ));
    }
    Ok(response.errors)
  }

  /// `POST /tools/{tool_id}/test`
  pub async fn test_tool(
    &self,
    tool_id: &str,
    config: &ConfigMap,
  ) -> Result<TestOutcome, BackendError> {
    let url = self.endpoint(&["tools", tool_id, "test"])?;
    let outcome: TestOutcome = self.send(Method::POST, url, Some(config)).await?;
    info!(
      tool_id,
      success = outcome.success,
      duration_ms = ?outcome.duration_ms,
      "tool test finished"
    );
    Ok(outcome)
  }

  /// `PUT /nodes/{node_id}/config`
  pub async fn save_node_config(&self, node_id: &str, config: &ConfigMap) -> Result<(), BackendError> {
    let url = self.endpoint(&["nodes", node_id, "config"])?;
    let _: Value = self.send(Method::PUT, url, Some(config)).await?;
    info!(node_id, "saved node config");
    Ok(())
  }

  fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
    let mut url = self.base_url.clone();
    url
      .path_segments_mut()
      .map_err(|_| BackendError::InvalidUrl(self.base_url.to_string()))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  async fn send<T: DeserializeOwned>(
    &self,
    method: Method,
    url: Url,
    body: Option<&ConfigMap>,
  ) -> Result<T, BackendError> {
    let mut request = self.http.request(method.clone(), url.clone());
    if let Some(body) = body {
      request = request.json(body);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
      let message = failure_message(response).await;
      warn!(%method, %url, status = status.as_u16(), %message, "backend request failed");
      return Err(BackendError::Status {
        status: status.as_u16(),
        message,
      });
    }

    let bytes = response.bytes().await?;
    // Empty bodies (e.g. 204) decode as null.
    let value: Value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).map_err(|e| BackendError::Decode(e.to_string()))?
    };
    serde_json::from_value(value).map_err(|e| BackendError::Decode(e.to_string()))
  }
}

/// The `error` or `detail` string of a failure body, or a generic message.
async fn failure_message(response: Response) -> String {
  let body: Option<Value> = response.json().await.ok();
  body
    .as_ref()
    .and_then(|b| {
      b.get("error")
        .and_then(Value::as_str)
        .or_else(|| b.get("detail").and_then(Value::as_str))
    })
    .unwrap_or("Request failed")
    .to_string()
}

#[async_trait]
impl RemoteValidator for BackendClient {
  async fn validate(
    &self,
    tool_id: &str,
    config: &ConfigMap,
  ) -> Result<BTreeMap<String, String>, BoxError> {
    Ok(self.validate_remote(tool_id, config).await?)
  }
}

/// Saves one node's configuration through the backend.
#[derive(Debug, Clone)]
pub struct NodeSaver {
  client: BackendClient,
  node_id: String,
}

impl NodeSaver {
  pub fn new(client: BackendClient, node_id: impl Into<String>) -> Self {
    Self {
      client,
      node_id: node_id.into(),
    }
  }

  pub fn node_id(&self) -> &str {
    &self.node_id
  }
}

#[async_trait]
impl ConfigSaver for NodeSaver {
  async fn save(&self, config: &ConfigMap) -> Result<(), BoxError> {
    Ok(self.client.save_node_config(&self.node_id, config).await?)
  }
}

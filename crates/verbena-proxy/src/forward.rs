//! Forwarding a request to the backend and relaying its answer.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tracing::{info, warn};
use url::Url;

use crate::error::ProxyError;

/// Detail used when a failing backend does not say why.
pub const FALLBACK_DETAIL: &str = "Request failed";

/// Shared state of the proxy routes.
#[derive(Debug, Clone)]
pub struct ProxyState {
  client: reqwest::Client,
  backend_url: Arc<Url>,
}

impl ProxyState {
  pub fn new(backend_url: &str) -> Result<Self, ProxyError> {
    Self::with_client(reqwest::Client::new(), backend_url)
  }

  pub fn with_client(client: reqwest::Client, backend_url: &str) -> Result<Self, ProxyError> {
    let url =
      Url::parse(backend_url).map_err(|e| ProxyError::InvalidUrl(format!("{}: {}", backend_url, e)))?;
    if url.cannot_be_a_base() {
      return Err(ProxyError::InvalidUrl(backend_url.to_string()));
    }
    Ok(Self {
      client,
      backend_url: Arc::new(url),
    })
  }

  pub fn backend_url(&self) -> &Url {
    &self.backend_url
  }

  /// Backend URL for a path suffix, carrying over the caller's query string.
  fn upstream(&self, segments: &[&str], query: Option<&str>) -> Result<Url, ProxyError> {
    let mut url = Url::clone(&self.backend_url);
    url
      .path_segments_mut()
      .map_err(|_| ProxyError::InvalidUrl(self.backend_url.to_string()))?
      .pop_if_empty()
      .extend(segments);
    url.set_query(query.filter(|q| !q.is_empty()));
    Ok(url)
  }

  /// Send `body` to the backend at `segments` and relay the response.
  ///
  /// An empty body is forwarded as no body; anything else must be JSON.
  pub async fn forward(
    &self,
    method: Method,
    segments: &[&str],
    query: Option<&str>,
    body: Bytes,
  ) -> Result<Response, ProxyError> {
    let url = self.upstream(segments, query)?;

    let mut request = self.client.request(method.clone(), url.clone());
    if !body.is_empty() {
      let payload: Value = serde_json::from_slice(&body).map_err(ProxyError::InvalidRequest)?;
      request = request.json(&payload);
    }

    let response = request.send().await?;
    let status = response.status();
    let bytes = response.bytes().await?;

    info!(%method, upstream = %url, status = status.as_u16(), "forwarded request");
    relay(status, &bytes)
  }
}

/// Turn a backend response into the proxy's response.
///
/// - success: the backend body and status, unchanged
/// - failure: `{ "error": detail }` with the backend status
pub fn relay(status: StatusCode, body: &[u8]) -> Result<Response, ProxyError> {
  if status.is_success() {
    if body.is_empty() {
      return Ok(status.into_response());
    }
    let value: Value = serde_json::from_slice(body).map_err(ProxyError::InvalidResponse)?;
    return Ok((status, Json(value)).into_response());
  }

  let parsed: Option<Value> = serde_json::from_slice(body).ok();
  let detail = parsed
    .as_ref()
    .and_then(failure_detail)
    .unwrap_or(FALLBACK_DETAIL);
  warn!(status = status.as_u16(), detail, "backend reported failure");
  Ok((status, Json(json!({ "error": detail }))).into_response())
}

/// The `error` or `detail` string of a failure body.
pub fn failure_detail(body: &Value) -> Option<&str> {
  ["error", "detail"]
    .into_iter()
    .find_map(|key| body.get(key).and_then(Value::as_str))
}

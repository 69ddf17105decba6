use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use verbena_config::ConfigMap;
use verbena_state::{BoxError, ConfigSaver, RemoteValidator};

use crate::client::{BackendClient, TestOutcome};
use crate::error::BackendError;
use crate::schema::{FieldErrors, ToolSchema};

/// At most one in-flight request for one operation.
///
/// Each [`begin`](RequestSlot::begin) cancels the request started before it.
#[derive(Debug)]
pub struct RequestSlot {
  parent: CancellationToken,
  current: Mutex<Option<CancellationToken>>,
}

impl RequestSlot {
  pub fn new(parent: &CancellationToken) -> Self {
    Self {
      parent: parent.clone(),
      current: Mutex::new(None),
    }
  }

  /// Cancel the previous request, if any, and hand out a token for the next.
  pub fn begin(&self) -> CancellationToken {
    let token = self.parent.child_token();
    let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(previous) = current.replace(token.clone()) {
      previous.cancel();
    }
    token
  }

  /// Run `fut` as the slot's current request.
  ///
  /// Resolves to [`BackendError::Cancelled`] if a newer request begins, or the
  /// parent is cancelled, before `fut` completes.
  pub async fn run<T, F>(&self, fut: F) -> Result<T, BackendError>
  where
    F: Future<Output = Result<T, BackendError>>,
  {
    let token = self.begin();
    tokio::select! {
      biased;
      _ = token.cancelled() => {
        debug!("request superseded");
        Err(BackendError::Cancelled)
      }
      result = fut => result,
    }
  }

  /// Cancel the in-flight request, if any.
  pub fn cancel(&self) {
    let current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(token) = current.as_ref() {
      token.cancel();
    }
  }
}

/// Backend operations for one open tool editor.
///
/// Every operation supersedes its own previous request: a second
/// `validate` cancels the first, but leaves a running `test` alone. Dropping
/// the session cancels everything it started.
pub struct ToolSession {
  client: Arc<BackendClient>,
  tool_id: String,
  root: CancellationToken,
  schema: RequestSlot,
  validate: RequestSlot,
  test: RequestSlot,
  save: RequestSlot,
}

impl ToolSession {
  pub fn new(client: Arc<BackendClient>, tool_id: impl Into<String>) -> Self {
    Self::with_parent(client, tool_id, &CancellationToken::new())
  }

  /// A session whose requests are also cancelled when `parent` is.
  pub fn with_parent(
    client: Arc<BackendClient>,
    tool_id: impl Into<String>,
    parent: &CancellationToken,
  ) -> Self {
    let root = parent.child_token();
    Self {
      client,
      tool_id: tool_id.into(),
      schema: RequestSlot::new(&root),
      validate: RequestSlot::new(&root),
      test: RequestSlot::new(&root),
      save: RequestSlot::new(&root),
      root,
    }
  }

  pub fn tool_id(&self) -> &str {
    &self.tool_id
  }

  /// Token cancelled when the session closes.
  pub fn token(&self) -> &CancellationToken {
    &self.root
  }

  pub async fn fetch_schema(&self) -> Result<ToolSchema, BackendError> {
    self
      .schema
      .run(self.client.fetch_schema(&self.tool_id))
      .await
  }

  pub async fn validate(&self, config: &ConfigMap) -> Result<FieldErrors, BackendError> {
    self
      .validate
      .run(self.client.validate_remote(&self.tool_id, config))
      .await
  }

  pub async fn test(&self, config: &ConfigMap) -> Result<TestOutcome, BackendError> {
    self
      .test
      .run(self.client.test_tool(&self.tool_id, config))
      .await
  }

  pub async fn save(&self, node_id: &str, config: &ConfigMap) -> Result<(), BackendError> {
    self
      .save
      .run(self.client.save_node_config(node_id, config))
      .await
  }

  /// Cancel every in-flight request. Later requests still run.
  pub fn cancel_all(&self) {
    for slot in [&self.schema, &self.validate, &self.test, &self.save] {
      slot.cancel();
    }
  }

  /// Saver bound to one node, sharing this session's save slot.
  pub fn saver<'a>(&'a self, node_id: &'a str) -> SessionSaver<'a> {
    SessionSaver {
      session: self,
      node_id,
    }
  }
}

impl Drop for ToolSession {
  fn drop(&mut self) {
    self.root.cancel();
  }
}

#[async_trait]
impl RemoteValidator for ToolSession {
  async fn validate(&self, tool_id: &str, config: &ConfigMap) -> Result<FieldErrors, BoxError> {
    if tool_id != self.tool_id {
      return Ok(self.client.validate_remote(tool_id, config).await?);
    }
    Ok(ToolSession::validate(self, config).await?)
  }
}

/// [`ConfigSaver`] view of a session for one node.
pub struct SessionSaver<'a> {
  session: &'a ToolSession,
  node_id: &'a str,
}

#[async_trait]
impl<'a> ConfigSaver for SessionSaver<'a> {
  async fn save(&self, config: &ConfigMap) -> Result<(), BoxError> {
    Ok(self.session.save(self.node_id, config).await?)
  }
}

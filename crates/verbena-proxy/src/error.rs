use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Body returned for every failure the backend did not report itself.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Error)]
pub enum ProxyError {
  /// The backend could not be reached or its response could not be read.
  #[error("upstream request failed: {0}")]
  Upstream(#[from] reqwest::Error),

  #[error("invalid request body: {0}")]
  InvalidRequest(#[source] serde_json::Error),

  #[error("invalid upstream response: {0}")]
  InvalidResponse(#[source] serde_json::Error),

  #[error("invalid backend url: {0}")]
  InvalidUrl(String),

  #[error("failed to read config file {path}: {source}")]
  ConfigRead {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config file {path}: {source}")]
  ConfigParse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to bind {addr}: {source}")]
  Bind {
    addr: SocketAddr,
    #[source]
    source: std::io::Error,
  },

  #[error("server error: {0}")]
  Serve(#[source] std::io::Error),
}

impl IntoResponse for ProxyError {
  fn into_response(self) -> Response {
    error!(error = %self, "proxy request failed");
    (
      StatusCode::INTERNAL_SERVER_ERROR,
      Json(json!({ "error": INTERNAL_ERROR_MESSAGE })),
    )
      .into_response()
  }
}

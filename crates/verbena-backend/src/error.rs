use thiserror::Error;

/// Errors from backend requests.
#[derive(Debug, Error)]
pub enum BackendError {
  /// The request could not be sent or the response could not be read.
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The backend answered with a non-success status.
  #[error("backend returned {status}: {message}")]
  Status { status: u16, message: String },

  /// The response body was not what the endpoint promises.
  #[error("invalid response from backend: {0}")]
  Decode(String),

  /// The request was superseded by a newer one or its session was closed.
  #[error("request cancelled")]
  Cancelled,

  #[error("invalid backend url: {0}")]
  InvalidUrl(String),
}

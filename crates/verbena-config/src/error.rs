use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("unknown tool: {0}")]
  UnknownTool(String),

  #[error("expected a configuration object, found {found}")]
  NotAnObject { found: &'static str },

  #[error("invalid configuration for tool '{tool}': {message}")]
  InvalidRecord { tool: String, message: String },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

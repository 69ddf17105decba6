use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ProxyError;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_BIND: SocketAddr = SocketAddr::new(
  std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
  3000,
);

/// Proxy settings, as stored in `proxy.json`.
///
/// Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProxyConfig {
  /// Address the proxy listens on
  pub bind: SocketAddr,

  /// Base URL of the tool backend
  pub backend_url: String,
}

impl Default for ProxyConfig {
  fn default() -> Self {
    Self {
      bind: DEFAULT_BIND,
      backend_url: DEFAULT_BACKEND_URL.to_string(),
    }
  }
}

impl ProxyConfig {
  pub fn load(path: &Path) -> Result<Self, ProxyError> {
    let content = std::fs::read_to_string(path).map_err(|source| ProxyError::ConfigRead {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| ProxyError::ConfigParse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Load `path` if it exists, otherwise the defaults.
  pub fn load_or_default(path: &Path) -> Result<Self, ProxyError> {
    if path.exists() {
      Self::load(path)
    } else {
      Ok(Self::default())
    }
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  #[test]
  fn test_partial_file_keeps_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "backend_url": "http://backend:9000" }}"#).unwrap();

    let config = ProxyConfig::load(file.path()).unwrap();
    assert_eq!(config.backend_url, "http://backend:9000");
    assert_eq!(config.bind, DEFAULT_BIND);
  }

  #[test]
  fn test_bind_parses_from_string() {
    let config: ProxyConfig = serde_json::from_str(r#"{ "bind": "0.0.0.0:8080" }"#).unwrap();
    assert_eq!(config.bind.port(), 8080);
    assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
  }

  #[test]
  fn test_unknown_keys_are_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "backend": "http://backend:9000" }}"#).unwrap();

    assert!(matches!(
      ProxyConfig::load(file.path()),
      Err(ProxyError::ConfigParse { .. })
    ));
  }

  #[test]
  fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("proxy.json");

    assert!(matches!(
      ProxyConfig::load(&path),
      Err(ProxyError::ConfigRead { .. })
    ));
    assert_eq!(
      ProxyConfig::load_or_default(&path).unwrap(),
      ProxyConfig::default()
    );
  }
}

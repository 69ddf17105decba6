//! Collaborators for saving and remote validation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use verbena_config::ConfigMap;

use crate::error::BoxError;

/// Persists a tool configuration somewhere outside the editor.
#[async_trait]
pub trait ConfigSaver: Send + Sync {
  async fn save(&self, config: &ConfigMap) -> Result<(), BoxError>;
}

/// Validates a tool configuration with a network round trip.
///
/// Returns field-level errors keyed by field name; an empty map means valid.
#[async_trait]
pub trait RemoteValidator: Send + Sync {
  async fn validate(
    &self,
    tool_id: &str,
    config: &ConfigMap,
  ) -> Result<BTreeMap<String, String>, BoxError>;
}

/// Which validation an editor runs, and when.
///
/// - `OnSave`: the local rules, on explicit save only.
/// - `Remote`: a remote validator, on demand only; save is not gated.
/// - `Both`: local rules gate saving, and on-demand checks run both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationPolicy {
  #[default]
  OnSave,
  Remote,
  Both,
}

impl ValidationPolicy {
  pub fn validates_locally(self) -> bool {
    matches!(self, ValidationPolicy::OnSave | ValidationPolicy::Both)
  }

  pub fn validates_remotely(self) -> bool {
    matches!(self, ValidationPolicy::Remote | ValidationPolicy::Both)
  }
}

//! The configuration reducer.
//!
//! State transitions are pure functions of `(state, action)`. A state wraps its
//! merged configuration in an `Arc`, and every transition allocates a new one,
//! so consumers can detect a change with [`ConfigState::same_as`] without
//! comparing contents.

use std::sync::Arc;

use serde_json::Value;
use verbena_config::{ConfigMap, merge};

/// The merged configuration of one tool editor.
#[derive(Debug, Clone)]
pub struct ConfigState {
  config: Arc<ConfigMap>,
}

impl ConfigState {
  fn from_map(config: ConfigMap) -> Self {
    Self {
      config: Arc::new(config),
    }
  }

  /// The full merged configuration.
  pub fn config(&self) -> &ConfigMap {
    &self.config
  }

  /// A shared handle to the merged configuration, as handed to observers.
  pub fn shared(&self) -> Arc<ConfigMap> {
    self.config.clone()
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.config.get(key)
  }

  /// Whether both states are the same allocation (no transition in between).
  pub fn same_as(&self, other: &ConfigState) -> bool {
    Arc::ptr_eq(&self.config, &other.config)
  }
}

/// Deep equality of the configurations.
impl PartialEq for ConfigState {
  fn eq(&self, other: &Self) -> bool {
    self.config == other.config
  }
}

/// A state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
  /// Replace the value of one field.
  SetField { key: String, value: Value },
  /// Replace several fields in one step.
  SetFields(ConfigMap),
  /// Re-seed from new external data merged over the defaults.
  Replace(ConfigMap),
}

/// Seed a state: `defaults` overlaid with `initial_data`.
///
/// Extra keys in `initial_data` pass through; keys it lacks fall back to the
/// defaults.
pub fn initialize(initial_data: &ConfigMap, defaults: &ConfigMap) -> ConfigState {
  ConfigState::from_map(merge(defaults, initial_data))
}

/// Return a new state with `key` set to `value` and every other key unchanged.
pub fn update_field(state: &ConfigState, key: impl Into<String>, value: Value) -> ConfigState {
  let mut next = state.config().clone();
  next.insert(key.into(), value);
  ConfigState::from_map(next)
}

/// Return a new state with every key of `patch` applied.
pub fn update_fields(state: &ConfigState, patch: &ConfigMap) -> ConfigState {
  ConfigState::from_map(merge(state.config(), patch))
}

/// Apply an action. `defaults` is only consulted by [`Action::Replace`].
pub fn reduce(state: &ConfigState, defaults: &ConfigMap, action: Action) -> ConfigState {
  match action {
    Action::SetField { key, value } => update_field(state, key, value),
    Action::SetFields(patch) => update_fields(state, &patch),
    Action::Replace(data) => initialize(&data, defaults),
  }
}
